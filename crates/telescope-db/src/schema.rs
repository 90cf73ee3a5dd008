//! Schema definitions and the migration runner.
//!
//! Records are keyed by integer IDs (`graph:9`) drawn from the
//! `sequence` table. Parent links are stored as plain integer fields so
//! a single-record read yields the parent ID.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct AppliedVersion {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "project_hierarchy",
    sql: SCHEMA_V1,
}];

const SCHEMA_V1: &str = "\
-- Projects (hierarchy root)
DEFINE TABLE project SCHEMAFULL;
DEFINE FIELD name ON TABLE project TYPE string;
DEFINE FIELD created_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE project TYPE datetime \
    DEFAULT time::now();

-- Graphs (owned by a project)
DEFINE TABLE graph SCHEMAFULL;
DEFINE FIELD project_id ON TABLE graph TYPE int;
DEFINE FIELD name ON TABLE graph TYPE string;
DEFINE FIELD created_at ON TABLE graph TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE graph TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_graph_project ON TABLE graph COLUMNS project_id;

-- Services (nodes on a graph)
DEFINE TABLE service SCHEMAFULL;
DEFINE FIELD graph_id ON TABLE service TYPE int;
DEFINE FIELD name ON TABLE service TYPE string;
DEFINE FIELD description ON TABLE service TYPE string DEFAULT '';
DEFINE FIELD x ON TABLE service TYPE float DEFAULT 0.0;
DEFINE FIELD y ON TABLE service TYPE float DEFAULT 0.0;
DEFINE INDEX idx_service_graph ON TABLE service COLUMNS graph_id;

-- Relations (directed edges between services of one graph)
DEFINE TABLE relation SCHEMAFULL;
DEFINE FIELD graph_id ON TABLE relation TYPE int;
DEFINE FIELD name ON TABLE relation TYPE string;
DEFINE FIELD description ON TABLE relation TYPE string DEFAULT '';
DEFINE FIELD from_service ON TABLE relation TYPE int;
DEFINE FIELD to_service ON TABLE relation TYPE int;
DEFINE INDEX idx_relation_graph ON TABLE relation COLUMNS graph_id;

-- ID allocation, one record per table
DEFINE TABLE sequence SCHEMAFULL;
DEFINE FIELD value ON TABLE sequence TYPE int DEFAULT 0;
";

/// Apply every migration newer than the recorded schema version.
///
/// The `_migration` table is created on first run; each applied
/// migration is recorded so later runs skip it.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let applied: Vec<AppliedVersion> = result.take(0)?;
    let current = applied.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}': {e}",
                migration.version, migration.name
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!("recording v{}: {e}", migration.version))
            })?;
    }

    Ok(())
}

/// Raw DDL of the first schema version.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
