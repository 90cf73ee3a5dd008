//! Role-gated access decisions.
//!
//! The gate composes hierarchy resolution with role authority probes
//! and fails closed: a resolution failure, an authority error, or the
//! absence of any confirmed role all produce [`Decision::Denied`]. The
//! [`DenyReason`] is kept for logging; callers must not expose it to
//! clients beyond the status class.
//!
//! Probes are issued one at a time and stop at the first affirmative
//! answer. The first authority error ends the decision.

use telescope_core::models::principal::Principal;
use telescope_core::models::resource::ResourceRef;
use telescope_core::models::role::Role;
use telescope_core::models::ProjectId;
use telescope_core::repository::HierarchyRepository;
use tracing::{debug, info, warn};

use crate::authority::{AuthorityError, RoleAuthority};
use crate::hierarchy::HierarchyResolver;

/// Why access was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The authority confirmed none of the roles that would satisfy the
    /// requirement.
    NoRole,
    /// The authority could not be reached or gave an unusable answer.
    AuthorityUnavailable(String),
    /// The target's owning project could not be determined.
    ResolutionFailed(String),
}

impl DenyReason {
    /// Short label for structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoRole => "no_role",
            DenyReason::AuthorityUnavailable(_) => "authority_unavailable",
            DenyReason::ResolutionFailed(_) => "resolution_failed",
        }
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Access granted. `confirmed` is the literal role the authority
    /// affirmed, which is at or above the requirement.
    Allowed {
        project_id: ProjectId,
        confirmed: Role,
    },
    Denied(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Access gate over a role authority and the containment hierarchy.
#[derive(Debug, Clone)]
pub struct AccessGate<A: RoleAuthority, H: HierarchyRepository> {
    authority: A,
    resolver: HierarchyResolver<H>,
}

impl<A: RoleAuthority, H: HierarchyRepository> AccessGate<A, H> {
    pub fn new(authority: A, edges: H) -> Self {
        Self {
            authority,
            resolver: HierarchyResolver::new(edges),
        }
    }

    /// The underlying authority, for calls that are not gate checks
    /// (owner registration, project listing).
    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Decide whether `principal` holds at least `required` on the
    /// project owning `target`.
    pub async fn authorize(
        &self,
        principal: &Principal,
        required: Role,
        target: ResourceRef,
    ) -> Decision {
        let project_id = match self.resolver.project_of(target).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    user_id = principal.user_id,
                    resource = %target,
                    required = %required,
                    error = %e,
                    "Access denied: owning project could not be resolved"
                );
                return Decision::Denied(DenyReason::ResolutionFailed(e.to_string()));
            }
        };

        self.authorize_project(principal, required, project_id).await
    }

    /// Decide whether `principal` holds at least `required` on
    /// `project_id`.
    ///
    /// The requirement is probed first, then each higher role, so a
    /// `viewer` requirement is met by an affirmative answer for
    /// `viewer`, `editor`, or `owner`.
    pub async fn authorize_project(
        &self,
        principal: &Principal,
        required: Role,
        project_id: ProjectId,
    ) -> Decision {
        for role in required.satisfying() {
            match self
                .authority
                .check_role(principal.user_id, project_id, role)
                .await
            {
                Ok(true) => {
                    debug!(
                        user_id = principal.user_id,
                        project_id,
                        required = %required,
                        confirmed = %role,
                        "Access allowed"
                    );
                    return Decision::Allowed {
                        project_id,
                        confirmed: role,
                    };
                }
                Ok(false) => continue,
                Err(e) => {
                    warn!(
                        user_id = principal.user_id,
                        project_id,
                        required = %required,
                        probed = %role,
                        error = %e,
                        "Access denied: role authority unavailable"
                    );
                    return Decision::Denied(DenyReason::AuthorityUnavailable(e.to_string()));
                }
            }
        }

        info!(
            user_id = principal.user_id,
            project_id,
            required = %required,
            "Access denied: no sufficient role"
        );
        Decision::Denied(DenyReason::NoRole)
    }

    /// The highest role `principal` holds on `project_id`, probing
    /// `owner`, `editor`, `viewer` in that order. `Ok(None)` means the
    /// authority confirmed no role.
    pub async fn effective_role(
        &self,
        principal: &Principal,
        project_id: ProjectId,
    ) -> Result<Option<Role>, AuthorityError> {
        for role in Role::DESCENDING {
            if self
                .authority
                .check_role(principal.user_id, project_id, role)
                .await?
            {
                return Ok(Some(role));
            }
        }
        Ok(None)
    }
}
