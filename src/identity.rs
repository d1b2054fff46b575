//! Identity provider seam.
//!
//! Everything that routes between the local and remote stores asks this trait
//! "who is signed in right now?". Anonymous users are a normal branch, not an
//! error: they get local-only persistence and zeroed usage stats.

use serde::{Deserialize, Serialize};

/// A resolved user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
}

/// Source of the current user identity. Implemented by the host's auth layer.
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in user, or `None` for anonymous/guest sessions.
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Fixed identity, for hosts that resolve auth once at startup and for tests.
pub struct StaticIdentity {
    user: Option<UserIdentity>,
}

impl StaticIdentity {
    pub fn signed_in(id: impl Into<String>) -> Self {
        Self {
            user: Some(UserIdentity {
                id: id.into(),
                email: None,
            }),
        }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user.clone()
    }
}
