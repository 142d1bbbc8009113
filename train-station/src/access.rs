//! Access policy gate.
//!
//! Every operation is classified by the resource it touches and the action
//! it performs; the resource decides which [`Policy`] applies.

use crate::identity::{Caller, Identity};

/// What an operation does to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Whether the action leaves state untouched.
    pub fn is_read_only(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// Resources exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Station,
    TrainType,
    Train,
    Route,
    Trip,
    Crew,
    Order,
}

impl Resource {
    /// The policy guarding this resource.
    pub fn policy(self) -> Policy {
        match self {
            Resource::Order => Policy::AuthenticatedOnly,
            Resource::Station
            | Resource::TrainType
            | Resource::Train
            | Resource::Route
            | Resource::Trip
            | Resource::Crew => Policy::AdminOrAuthenticatedReadOnly,
        }
    }
}

/// Named authorization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Anyone signed in may read; only staff may write.
    AdminOrAuthenticatedReadOnly,
    /// Anyone signed in may do anything the resource exposes.
    AuthenticatedOnly,
}

/// Why a caller was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// No identity at all.
    #[error("authentication credentials were not provided")]
    Unauthenticated,

    /// Signed in, but not allowed to do this.
    #[error("you do not have permission to perform this action")]
    Forbidden,
}

impl Policy {
    /// Check `caller` against this policy for `action`.
    ///
    /// Returns the caller's identity when allowed.
    pub fn authorize(self, action: Action, caller: &Caller) -> Result<&Identity, AccessError> {
        let Caller::Authenticated(identity) = caller else {
            return Err(AccessError::Unauthenticated);
        };

        match self {
            Policy::AuthenticatedOnly => Ok(identity),
            Policy::AdminOrAuthenticatedReadOnly => {
                if action.is_read_only() || identity.is_staff {
                    Ok(identity)
                } else {
                    Err(AccessError::Forbidden)
                }
            }
        }
    }
}

/// Check `caller` may perform `action` on `resource`.
pub fn authorize(resource: Resource, action: Action, caller: &Caller) -> Result<&Identity, AccessError> {
    resource.policy().authorize(action, caller)
}
