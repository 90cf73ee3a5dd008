//! SurrealDB repository implementations.

mod graph;
mod hierarchy;
mod project;
mod relation;
mod service;

pub use graph::SurrealGraphRepository;
pub use hierarchy::SurrealHierarchyRepository;
pub use project::SurrealProjectRepository;
pub use relation::SurrealRelationRepository;
pub use service::SurrealServiceRepository;

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SequenceRow {
    value: i64,
}

#[derive(Debug, SurrealValue)]
struct IdRow {
    record_id: i64,
}

/// Reserve `count` consecutive IDs for `table` and return the first.
///
/// The counter lives in `sequence:<table>` and is bumped by a single
/// UPSERT, so concurrent callers never receive overlapping ranges.
async fn reserve_ids<C: Connection>(
    db: &Surreal<C>,
    table: &'static str,
    count: usize,
) -> Result<i64, DbError> {
    let count = i64::try_from(count).map_err(|e| DbError::Query(e.to_string()))?;
    let mut result = db
        .query(
            "UPSERT type::record('sequence', $table) \
             SET value = (value ?? 0) + $count RETURN AFTER",
        )
        .bind(("table", table))
        .bind(("count", count))
        .await?
        .check()
        .map_err(|e| DbError::Query(e.to_string()))?;

    let rows: Vec<SequenceRow> = result.take(0)?;
    let last = rows
        .into_iter()
        .next()
        .map(|r| r.value)
        .ok_or_else(|| DbError::Query(format!("sequence for {table} returned no value")))?;
    Ok(last - count + 1)
}

/// Fail with `NotFound` unless `table:id` exists.
async fn ensure_exists<C: Connection>(
    db: &Surreal<C>,
    table: &'static str,
    id: i64,
) -> Result<(), DbError> {
    let mut result = db
        .query("SELECT meta::id(id) AS record_id FROM type::record($table, $id)")
        .bind(("table", table))
        .bind(("id", id))
        .await?;
    let rows: Vec<IdRow> = result.take(0)?;
    if rows.is_empty() {
        return Err(DbError::not_found(table, id));
    }
    Ok(())
}

/// IDs of every record in `table` whose `graph_id` is `graph_id`.
async fn ids_in_graph<C: Connection>(
    db: &Surreal<C>,
    table: &'static str,
    graph_id: i64,
) -> Result<Vec<i64>, DbError> {
    let mut result = db
        .query("SELECT meta::id(id) AS record_id FROM type::table($table) WHERE graph_id = $graph_id")
        .bind(("table", table))
        .bind(("graph_id", graph_id))
        .await?;
    let rows: Vec<IdRow> = result.take(0)?;
    Ok(rows.into_iter().map(|r| r.record_id).collect())
}
