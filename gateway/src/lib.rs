// gateway/src/lib.rs
//
// Client for the hosted Gateway: a generic table CRUD interface under
// /rest/v1 and an authentication interface under /auth/v1. Everything the
// screens and the session layer need from the network goes through the two
// trait seams defined here.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use models::{AuthSession, HmsResult, Profile, ProfilePatch, SignUpOutcome, SignUpRequest};

mod config;
mod http;
mod query;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use crate::config::GatewayConfig;
pub use crate::http::HttpGateway;
pub use crate::query::SelectQuery;

/// Table-scoped CRUD against the Gateway's relational interface. Rows move
/// as raw JSON objects; callers deserialize into their own types.
#[async_trait]
pub trait TableApi: Send + Sync {
    /// All rows matching the query; an empty match is an empty vec, not an
    /// error.
    async fn select(&self, table: &str, query: &SelectQuery) -> HmsResult<Vec<Value>>;

    /// Count-only query; no row payload crosses the wire.
    async fn count(&self, table: &str) -> HmsResult<u64>;

    /// Inserts a single row and returns the stored representation
    /// (server-generated id and timestamps included).
    async fn insert(&self, table: &str, row: Value) -> HmsResult<Value>;

    /// Patches the row keyed by id equality. Matching no row is an error.
    async fn update(&self, table: &str, id: Uuid, patch: Value) -> HmsResult<()>;

    /// Deletes the row keyed by id equality. Matching no row is an error.
    async fn delete(&self, table: &str, id: Uuid) -> HmsResult<()>;
}

/// The Gateway's authentication surface. The implementation holds the
/// current access token; the session layer never sees raw tokens.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> HmsResult<AuthSession>;

    async fn sign_up(&self, req: SignUpRequest) -> HmsResult<SignUpOutcome>;

    /// The session behind the currently held token, if any. A missing,
    /// rejected, or expired token yields `None`, not an error.
    async fn current_session(&self) -> HmsResult<Option<AuthSession>>;

    /// Revokes the held token. The local token is dropped even when the
    /// revocation call fails.
    async fn sign_out(&self) -> HmsResult<()>;

    async fn get_profile(&self, user_id: Uuid) -> HmsResult<Option<Profile>>;

    async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> HmsResult<()>;

    /// Redeems the emailed 6-digit code and activates the session.
    async fn verify_otp(&self, email: &str, code: &str) -> HmsResult<AuthSession>;

    async fn resend_otp(&self, email: &str) -> HmsResult<()>;
}
