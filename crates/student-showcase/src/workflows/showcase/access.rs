use std::fmt;
use std::sync::Arc;

use super::domain::{Role, UserId};
use super::repository::{RoleRepository, RepositoryError};

/// Identity of whoever issued a request, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(UserId),
}

impl Caller {
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(UserId(id.into()))
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(id),
        }
    }
}

/// Operations gated by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    BrowseDirectory,
    SubmitProfile,
    ManageOwnProfile,
    ModerateSubmissions,
    ManageRoster,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Action::BrowseDirectory => "browsing the directory",
            Action::SubmitProfile => "submitting a profile",
            Action::ManageOwnProfile => "managing your profile",
            Action::ModerateSubmissions => "moderating submissions",
            Action::ManageRoster => "managing students",
        }
    }

    const fn required_role(self) -> Option<Role> {
        match self {
            Action::ModerateSubmissions | Action::ManageRoster => Some(Role::Admin),
            _ => None,
        }
    }

    const fn requires_user(self) -> bool {
        !matches!(self, Action::BrowseDirectory | Action::SubmitProfile)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(AccessDenied),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("sign in required for {action}")]
    Unauthenticated { action: Action },
    #[error("{action} requires the {} role", .role.as_str())]
    MissingRole { action: Action, role: Role },
}

/// Failure to clear the policy: either a denial or a role lookup error.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    #[error(transparent)]
    Denied(#[from] AccessDenied),
    #[error("could not verify permissions: {0}")]
    Repository(#[from] RepositoryError),
}

/// Role-grant backed policy. A missing grant denies; a failed lookup never allows.
#[derive(Clone)]
pub struct AccessPolicy {
    roles: Arc<dyn RoleRepository>,
}

impl AccessPolicy {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    pub fn authorize(
        &self,
        caller: &Caller,
        action: Action,
    ) -> Result<AccessDecision, RepositoryError> {
        if !action.requires_user() {
            return Ok(AccessDecision::Allow);
        }

        let Some(user_id) = caller.user_id() else {
            return Ok(AccessDecision::Deny(AccessDenied::Unauthenticated { action }));
        };

        match action.required_role() {
            None => Ok(AccessDecision::Allow),
            Some(role) if self.roles.has_role(user_id, role)? => Ok(AccessDecision::Allow),
            Some(role) => Ok(AccessDecision::Deny(AccessDenied::MissingRole {
                action,
                role,
            })),
        }
    }

    /// Like [`authorize`](Self::authorize) but turns a denial into an error.
    pub fn require(&self, caller: &Caller, action: Action) -> Result<(), AuthorizationError> {
        match self.authorize(caller, action)? {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(denied) => Err(denied.into()),
        }
    }

    /// Requires a signed-in caller and returns its id.
    pub fn require_user<'a>(
        &self,
        caller: &'a Caller,
        action: Action,
    ) -> Result<&'a UserId, AuthorizationError> {
        self.require(caller, action)?;
        caller
            .user_id()
            .ok_or(AuthorizationError::Denied(AccessDenied::Unauthenticated {
                action,
            }))
    }
}

impl fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessPolicy").finish_non_exhaustive()
    }
}
