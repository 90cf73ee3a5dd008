//! Telescope Auth: bearer token authentication and role-gated access
//! control over the project hierarchy.
//!
//! A request passes through these stages in order:
//! [`Authenticator`] → [`HierarchyResolver`] → [`AccessGate`], with the
//! gate consulting a [`RoleAuthority`] for the caller's role on the
//! owning project.

pub mod authority;
pub mod config;
pub mod error;
pub mod gate;
pub mod hierarchy;
pub mod token;

pub use authority::{AuthorityError, HttpRoleAuthority, RoleAuthority};
pub use config::{AuthConfig, AuthorityConfig};
pub use error::AuthError;
pub use gate::{AccessGate, Decision, DenyReason};
pub use hierarchy::{HierarchyResolver, ResolutionError};
pub use token::Authenticator;
