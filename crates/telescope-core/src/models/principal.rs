//! The authenticated caller of a request.

use chrono::{DateTime, Utc};

use super::UserId;

/// Identity extracted from a verified bearer token. Lives for one
/// request and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub token_expiry: DateTime<Utc>,
}
