//! Telescope Core: domain models, role ordering, and repository
//! traits shared by every Telescope crate.

pub mod error;
pub mod models;
pub mod repository;
