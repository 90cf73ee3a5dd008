//! Database-specific error types and conversions.

use telescope_core::error::TelescopeError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: i64) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for TelescopeError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TelescopeError::NotFound { entity, id },
            other => TelescopeError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_its_kind() {
        let err: TelescopeError = DbError::not_found("graph", 99).into();
        match err {
            TelescopeError::NotFound { entity, id } => {
                assert_eq!(entity, "graph");
                assert_eq!(id, "99");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn other_errors_become_database_errors() {
        let err: TelescopeError = DbError::Query("boom".into()).into();
        assert!(matches!(err, TelescopeError::Database(_)));
    }
}
