// session/src/store.rs

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use gateway::AuthApi;
use models::{AuthUser, HmsResult, Identity};

/// Point-in-time view of the session, as handed to the route guard and the
/// screens.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub loading: bool,
}

/// Process-wide holder of the authenticated identity. Initialized once at
/// application start with the loading flag set; every resolution path
/// clears that flag, whatever the outcome.
pub struct SessionStore {
    auth: Arc<dyn AuthApi>,
    state: RwLock<SessionSnapshot>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthApi>) -> Self {
        SessionStore {
            auth,
            state: RwLock::new(SessionSnapshot {
                identity: None,
                loading: true,
            }),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    /// Resolves the identity behind whatever session the Gateway still
    /// holds. An absent or erroring session resolves to no identity.
    pub async fn refresh_identity(&self) {
        let resolved = match self.auth.current_session().await {
            Ok(Some(session)) => Some(self.resolve(&session.user).await),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "session refresh failed");
                None
            }
        };
        let mut state = self.state.write().await;
        state.identity = resolved;
        state.loading = false;
    }

    /// Signs in and installs the resolved identity before returning. On
    /// failure the stored identity is left exactly as it was; no partial
    /// identity is ever written.
    pub async fn login(&self, email: &str, password: &str) -> HmsResult<Identity> {
        let session = self.auth.sign_in(email, password).await?;
        let identity = self.resolve(&session.user).await;
        let mut state = self.state.write().await;
        state.identity = Some(identity.clone());
        state.loading = false;
        Ok(identity)
    }

    /// Clears the identity unconditionally. A failing Gateway sign-out is
    /// logged and otherwise ignored.
    pub async fn logout(&self) {
        if let Err(err) = self.auth.sign_out().await {
            warn!(error = %err, "Gateway sign-out failed; clearing the session anyway");
        }
        self.state.write().await.identity = None;
    }

    /// Installs the identity for a session the auth flow just activated
    /// (sign-up or OTP verification).
    pub(crate) async fn install(&self, user: &AuthUser) -> Identity {
        let identity = self.resolve(user).await;
        let mut state = self.state.write().await;
        state.identity = Some(identity.clone());
        state.loading = false;
        identity
    }

    /// Profile lookup with fallbacks; a failing lookup degrades to the
    /// email-derived name and the default role.
    async fn resolve(&self, user: &AuthUser) -> Identity {
        let profile = match self.auth.get_profile(user.id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err, user_id = %user.id, "profile lookup failed");
                None
            }
        };
        Identity::resolve(user, profile.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_stub::StubAuth;
    use models::{AuthSession, HmsError, DEFAULT_ROLE};

    fn store_with(stub: Arc<StubAuth>) -> SessionStore {
        SessionStore::new(stub)
    }

    #[tokio::test]
    async fn login_resolves_a_full_identity_with_default_role() {
        let stub = Arc::new(StubAuth::new());
        stub.stub_sign_in(Ok(stub.session_for("jane@hospital.test")));
        let store = store_with(stub.clone());

        let identity = store.login("jane@hospital.test", "pw").await.unwrap();
        assert_eq!(identity.role, DEFAULT_ROLE);
        assert_eq!(identity.name, "jane");
        assert_eq!(store.identity().await, Some(identity));
    }

    #[tokio::test]
    async fn login_takes_name_and_role_from_the_profile_when_present() {
        let stub = Arc::new(StubAuth::new());
        let session = stub.session_for("jane@hospital.test");
        stub.stub_profile(models::Profile {
            id: session.user.id,
            email: session.user.email.clone(),
            role: Some("doctor".to_string()),
            full_name: Some("Dr. Jane Doe".to_string()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });
        stub.stub_sign_in(Ok(session));
        let store = store_with(stub);

        let identity = store.login("jane@hospital.test", "pw").await.unwrap();
        assert_eq!(identity.name, "Dr. Jane Doe");
        assert_eq!(identity.role, "doctor");
    }

    #[tokio::test]
    async fn failed_login_leaves_identity_unset() {
        let stub = Arc::new(StubAuth::new());
        stub.stub_sign_in(Err(HmsError::Auth("Invalid login credentials".to_string())));
        let store = store_with(stub);

        let err = store.login("jane@hospital.test", "bad").await.unwrap_err();
        assert_eq!(err.message(), "Invalid login credentials");
        assert!(store.identity().await.is_none());
    }

    #[tokio::test]
    async fn logout_clears_identity_even_when_sign_out_fails() {
        let stub = Arc::new(StubAuth::new());
        stub.stub_sign_in(Ok(stub.session_for("jane@hospital.test")));
        stub.stub_sign_out(Err(HmsError::Network("offline".to_string())));
        let store = store_with(stub);

        store.login("jane@hospital.test", "pw").await.unwrap();
        store.logout().await;
        assert!(store.identity().await.is_none());
    }

    #[tokio::test]
    async fn refresh_clears_loading_on_every_path() {
        // No session held.
        let stub = Arc::new(StubAuth::new());
        let store = store_with(stub);
        assert!(store.snapshot().await.loading);
        store.refresh_identity().await;
        let snap = store.snapshot().await;
        assert!(!snap.loading);
        assert!(snap.identity.is_none());

        // Session retrieval fails outright.
        let stub = Arc::new(StubAuth::new());
        stub.stub_current_session(Err(HmsError::Network("offline".to_string())));
        let store = store_with(stub);
        store.refresh_identity().await;
        let snap = store.snapshot().await;
        assert!(!snap.loading);
        assert!(snap.identity.is_none());
    }

    #[tokio::test]
    async fn refresh_restores_identity_from_a_held_session() {
        let stub = Arc::new(StubAuth::new());
        let session: AuthSession = stub.session_for("jane@hospital.test");
        stub.stub_current_session(Ok(Some(session)));
        let store = store_with(stub);

        store.refresh_identity().await;
        let snap = store.snapshot().await;
        assert_eq!(snap.identity.unwrap().email, "jane@hospital.test");
    }

    #[tokio::test]
    async fn a_failing_profile_lookup_degrades_to_fallbacks() {
        let stub = Arc::new(StubAuth::new());
        stub.stub_sign_in(Ok(stub.session_for("jane@hospital.test")));
        stub.stub_profile_error(HmsError::DataAccess("profiles down".to_string()));
        let store = store_with(stub);

        let identity = store.login("jane@hospital.test", "pw").await.unwrap();
        assert_eq!(identity.name, "jane");
        assert_eq!(identity.role, DEFAULT_ROLE);
    }
}
