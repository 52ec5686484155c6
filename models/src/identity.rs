// models/src/identity.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::medical::Profile;

/// Role assigned when the profile carries none. An identity's role is
/// never empty.
pub const DEFAULT_ROLE: &str = "staff";

/// The authenticated user as the rest of the application sees it. Owned by
/// the session store; created on login/signup/session-refresh, destroyed
/// on logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl Identity {
    /// Merges the session user with its profile row. The display name
    /// falls back to the email local-part, then to "User"; the role falls
    /// back to [`DEFAULT_ROLE`].
    pub fn resolve(user: &AuthUser, profile: Option<&Profile>) -> Self {
        let name = profile
            .and_then(|p| p.full_name.clone())
            .filter(|n| !n.is_empty())
            .or_else(|| user.email.split('@').next().map(str::to_string))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "User".to_string());

        let role = profile
            .and_then(|p| p.role.clone())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        Identity {
            id: user.id,
            email: user.email.clone(),
            name,
            role,
        }
    }
}
