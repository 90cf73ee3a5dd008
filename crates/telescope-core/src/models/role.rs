//! Project roles and their privilege order.
//!
//! The role authority answers one literal role at a time, so the
//! ordering lives here: callers decide which literal roles to probe
//! from [`Role::satisfying`] and [`Role::DESCENDING`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TelescopeError;

/// A role a user holds on a project, ordered by increasing privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Owner,
}

impl Role {
    /// Every role, lowest privilege first.
    pub const ASCENDING: [Role; 3] = [Role::Viewer, Role::Editor, Role::Owner];

    /// Every role, highest privilege first. Used to discover the
    /// effective role a user holds.
    pub const DESCENDING: [Role; 3] = [Role::Owner, Role::Editor, Role::Viewer];

    /// Wire name understood by the role authority.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Owner => "owner",
        }
    }

    /// Literal roles whose confirmation satisfies a requirement of
    /// `self`, starting with `self` and escalating.
    pub fn satisfying(self) -> impl Iterator<Item = Role> {
        Self::ASCENDING.into_iter().filter(move |r| *r >= self)
    }

    /// Whether holding `self` meets a `required` minimum.
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TelescopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "owner" => Ok(Role::Owner),
            other => Err(TelescopeError::Validation {
                message: format!("unknown role: {other}"),
            }),
        }
    }
}
