//! Telescope Database: SurrealDB storage for the project hierarchy.
//!
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema migrations ([`run_migrations`])
//! - Repository implementations of the `telescope-core` traits
//!   ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
