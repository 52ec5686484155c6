// models/src/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The Gateway's view of an authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// An active session: the bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

/// Payload for the sign-up call. The chosen role is not part of it; the
/// role lives on the profile row and is patched in after the account
/// exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// What the Gateway handed back for a sign-up.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account is usable immediately.
    Active(AuthSession),
    /// The Gateway withheld a token until the email is verified by OTP.
    VerificationRequired { email: String },
}
