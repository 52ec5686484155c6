// session/src/flow.rs

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use gateway::AuthApi;
use models::{HmsError, HmsResult, Identity, ProfilePatch, SignUpOutcome, SignUpRequest};

use crate::credentials::{CredentialStore, RememberedCredentials};
use crate::store::SessionStore;

/// Roles offered by the sign-up form.
pub const ROLES: &[&str] = &["doctor", "staff", "admin"];

const OTP_LEN: usize = 6;

/// Where the auth flow currently stands. `PendingVerification` carries the
/// email the code went to, plus the role chosen at sign-up so it can be
/// written once the account is usable.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthFlow {
    Anonymous,
    Authenticating,
    Authenticated,
    SigningUp,
    PendingVerification { email: String, role: String },
}

/// Point-in-time view of the flow: the state itself, the inline error
/// shown on the active form, and a transient notice.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSnapshot {
    pub flow: AuthFlow,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

impl LoginForm {
    pub fn validate(&self) -> HmsResult<()> {
        if self.email.trim().is_empty() {
            return Err(HmsError::Validation("Email is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(HmsError::Validation("Password is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> HmsResult<()> {
        if self.full_name.trim().is_empty() {
            return Err(HmsError::Validation("Full name is required".to_string()));
        }
        if !self.email.contains('@') {
            return Err(HmsError::Validation(
                "Enter a valid email address".to_string(),
            ));
        }
        if self.role.trim().is_empty() {
            return Err(HmsError::Validation("Select a role".to_string()));
        }
        if self.password.len() < 6 {
            return Err(HmsError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(HmsError::Validation("Passwords do not match".to_string()));
        }
        Ok(())
    }
}

/// Drives the login, sign-up, and OTP screens against the Gateway and the
/// session store, and keeps the remembered-credential slots in step with
/// the "remember me" toggle.
pub struct AuthFlowController {
    auth: Arc<dyn AuthApi>,
    session: Arc<SessionStore>,
    credentials: CredentialStore,
    state: RwLock<FlowSnapshot>,
}

impl AuthFlowController {
    pub fn new(auth: Arc<dyn AuthApi>, session: Arc<SessionStore>, credentials: CredentialStore) -> Self {
        AuthFlowController {
            auth,
            session,
            credentials,
            state: RwLock::new(FlowSnapshot {
                flow: AuthFlow::Anonymous,
                error: None,
                notice: None,
            }),
        }
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        self.state.read().await.clone()
    }

    /// Hands the transient notice to the UI and clears it.
    pub async fn take_notice(&self) -> Option<String> {
        self.state.write().await.notice.take()
    }

    /// Credentials left behind by a previous "remember me" login, read at
    /// application start.
    pub fn remembered(&self) -> Option<RememberedCredentials> {
        match self.credentials.load() {
            Ok(remembered) => remembered,
            Err(err) => {
                warn!(error = %err, "remembered credentials unreadable");
                None
            }
        }
    }

    pub async fn login(&self, form: &LoginForm) -> HmsResult<Identity> {
        if let Err(err) = form.validate() {
            self.fail(AuthFlow::Anonymous, &err).await;
            return Err(err);
        }

        {
            let mut state = self.state.write().await;
            state.flow = AuthFlow::Authenticating;
            state.error = None;
        }

        match self.session.login(&form.email, &form.password).await {
            Ok(identity) => {
                self.remember(form);
                self.state.write().await.flow = AuthFlow::Authenticated;
                Ok(identity)
            }
            Err(err) => {
                self.fail(AuthFlow::Anonymous, &err).await;
                Err(err)
            }
        }
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> HmsResult<AuthFlow> {
        if let Err(err) = form.validate() {
            self.fail(AuthFlow::Anonymous, &err).await;
            return Err(err);
        }

        {
            let mut state = self.state.write().await;
            state.flow = AuthFlow::SigningUp;
            state.error = None;
        }

        let req = SignUpRequest {
            email: form.email.clone(),
            password: form.password.clone(),
            name: form.full_name.clone(),
        };
        match self.auth.sign_up(req).await {
            Err(err) => {
                self.fail(AuthFlow::Anonymous, &err).await;
                Err(err)
            }
            Ok(SignUpOutcome::VerificationRequired { email }) => {
                let flow = AuthFlow::PendingVerification {
                    email,
                    role: form.role.clone(),
                };
                self.state.write().await.flow = flow.clone();
                Ok(flow)
            }
            Ok(SignUpOutcome::Active(auth_session)) => {
                self.assign_role(auth_session.user.id, &form.role).await;
                self.session.install(&auth_session.user).await;
                self.state.write().await.flow = AuthFlow::Authenticated;
                Ok(AuthFlow::Authenticated)
            }
        }
    }

    /// Submits the emailed code. Failures leave the flow (and whatever the
    /// user typed) in place; only the inline error changes.
    pub async fn verify_otp(&self, code: &str) -> HmsResult<Identity> {
        let AuthFlow::PendingVerification { email, role } = self.snapshot().await.flow else {
            let err = HmsError::Validation("No sign-up awaiting verification".to_string());
            self.state.write().await.error = Some(err.message().to_string());
            return Err(err);
        };

        if code.len() != OTP_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
            let err = HmsError::Validation("Enter the 6-digit code from your email".to_string());
            self.state.write().await.error = Some(err.message().to_string());
            return Err(err);
        }

        match self.auth.verify_otp(&email, code).await {
            Err(err) => {
                self.state.write().await.error = Some(err.message().to_string());
                Err(err)
            }
            Ok(auth_session) => {
                self.assign_role(auth_session.user.id, &role).await;
                let identity = self.session.install(&auth_session.user).await;
                let mut state = self.state.write().await;
                state.flow = AuthFlow::Authenticated;
                state.error = None;
                Ok(identity)
            }
        }
    }

    pub async fn resend_otp(&self) -> HmsResult<()> {
        let AuthFlow::PendingVerification { email, .. } = self.snapshot().await.flow else {
            let err = HmsError::Validation("No sign-up awaiting verification".to_string());
            self.state.write().await.error = Some(err.message().to_string());
            return Err(err);
        };

        match self.auth.resend_otp(&email).await {
            Err(err) => {
                self.state.write().await.error = Some(err.message().to_string());
                Err(err)
            }
            Ok(()) => {
                self.state.write().await.notice =
                    Some("A new verification code is on its way".to_string());
                Ok(())
            }
        }
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        let mut state = self.state.write().await;
        state.flow = AuthFlow::Anonymous;
        state.error = None;
        state.notice = None;
    }

    /// The chosen role lives on the profile row and is written after the
    /// account exists. The account outlives a failed write: the failure is
    /// logged and surfaced as a notice, and the identity falls back to the
    /// default role.
    async fn assign_role(&self, user_id: Uuid, role: &str) {
        if let Err(err) = self
            .auth
            .update_profile(user_id, ProfilePatch::role(role))
            .await
        {
            warn!(error = %err, %user_id, "role assignment after sign-up failed");
            self.state.write().await.notice =
                Some("Account created, but the selected role could not be saved".to_string());
        }
    }

    fn remember(&self, form: &LoginForm) {
        let result = if form.remember {
            self.credentials.save(&RememberedCredentials {
                email: form.email.clone(),
                password: form.password.clone(),
            })
        } else {
            self.credentials.clear()
        };
        if let Err(err) = result {
            warn!(error = %err, "remembered-credential slots not updated");
        }
    }

    async fn fail(&self, flow: AuthFlow, err: &HmsError) {
        let mut state = self.state.write().await;
        state.flow = flow;
        state.error = Some(err.message().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_stub::StubAuth;
    use models::ErrorKind;
    use tempfile::TempDir;

    struct Fixture {
        stub: Arc<StubAuth>,
        session: Arc<SessionStore>,
        controller: AuthFlowController,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let stub = Arc::new(StubAuth::new());
        let session = Arc::new(SessionStore::new(stub.clone()));
        let dir = TempDir::new().unwrap();
        let credentials = CredentialStore::at(dir.path().join("credentials.json"));
        let controller =
            AuthFlowController::new(stub.clone(), session.clone(), credentials);
        Fixture {
            stub,
            session,
            controller,
            _dir: dir,
        }
    }

    fn sign_up_form() -> SignUpForm {
        SignUpForm {
            full_name: "Dr. New".to_string(),
            email: "new@hospital.test".to_string(),
            role: "doctor".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn mismatched_passwords_block_submission_without_a_gateway_call() {
        let fx = fixture();
        let mut form = sign_up_form();
        form.confirm_password = "different".to_string();

        let err = fx.controller.sign_up(&form).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "Passwords do not match");
        assert!(fx.stub.calls().is_empty());
        assert_eq!(
            fx.controller.snapshot().await.error.as_deref(),
            Some("Passwords do not match")
        );
    }

    #[tokio::test]
    async fn sign_up_moves_to_pending_verification() {
        let fx = fixture();
        fx.stub.stub_sign_up(Ok(SignUpOutcome::VerificationRequired {
            email: "new@hospital.test".to_string(),
        }));

        let flow = fx.controller.sign_up(&sign_up_form()).await.unwrap();
        assert_eq!(
            flow,
            AuthFlow::PendingVerification {
                email: "new@hospital.test".to_string(),
                role: "doctor".to_string(),
            }
        );
        // Nothing authenticated yet.
        assert!(fx.session.identity().await.is_none());
    }

    #[tokio::test]
    async fn an_immediately_active_sign_up_authenticates_and_writes_the_role() {
        let fx = fixture();
        let auth_session = fx.stub.session_for("new@hospital.test");
        fx.stub.stub_sign_up(Ok(SignUpOutcome::Active(auth_session)));

        let flow = fx.controller.sign_up(&sign_up_form()).await.unwrap();
        assert_eq!(flow, AuthFlow::Authenticated);
        assert!(fx.session.identity().await.is_some());
        assert!(fx.stub.calls().contains(&"update_profile".to_string()));
    }

    #[tokio::test]
    async fn a_failed_role_write_is_surfaced_as_a_notice_not_an_error() {
        let fx = fixture();
        let auth_session = fx.stub.session_for("new@hospital.test");
        fx.stub.stub_sign_up(Ok(SignUpOutcome::Active(auth_session)));
        fx.stub
            .stub_update_profile(Err(HmsError::DataAccess("profiles down".to_string())));

        let flow = fx.controller.sign_up(&sign_up_form()).await.unwrap();
        assert_eq!(flow, AuthFlow::Authenticated);
        let notice = fx.controller.take_notice().await.unwrap();
        assert!(notice.contains("role could not be saved"));
        // The identity still resolved, with the default role.
        assert_eq!(fx.session.identity().await.unwrap().role, "staff");
    }

    #[tokio::test]
    async fn a_malformed_code_is_rejected_before_any_gateway_call() {
        let fx = fixture();
        fx.stub.stub_sign_up(Ok(SignUpOutcome::VerificationRequired {
            email: "new@hospital.test".to_string(),
        }));
        fx.controller.sign_up(&sign_up_form()).await.unwrap();
        let calls_before = fx.stub.calls().len();

        let err = fx.controller.verify_otp("12ab56").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fx.stub.calls().len(), calls_before);
        // Still pending; the user can correct the code.
        assert!(matches!(
            fx.controller.snapshot().await.flow,
            AuthFlow::PendingVerification { .. }
        ));
    }

    #[tokio::test]
    async fn a_rejected_code_keeps_the_pending_state_with_an_inline_error() {
        let fx = fixture();
        fx.stub.stub_sign_up(Ok(SignUpOutcome::VerificationRequired {
            email: "new@hospital.test".to_string(),
        }));
        fx.controller.sign_up(&sign_up_form()).await.unwrap();
        fx.stub
            .stub_verify(Err(HmsError::Auth("Code expired".to_string())));

        assert!(fx.controller.verify_otp("123456").await.is_err());
        let snap = fx.controller.snapshot().await;
        assert!(matches!(snap.flow, AuthFlow::PendingVerification { .. }));
        assert_eq!(snap.error.as_deref(), Some("Code expired"));
    }

    #[tokio::test]
    async fn a_verified_code_completes_the_flow() {
        let fx = fixture();
        fx.stub.stub_sign_up(Ok(SignUpOutcome::VerificationRequired {
            email: "new@hospital.test".to_string(),
        }));
        fx.controller.sign_up(&sign_up_form()).await.unwrap();
        fx.stub
            .stub_verify(Ok(fx.stub.session_for("new@hospital.test")));

        let identity = fx.controller.verify_otp("123456").await.unwrap();
        assert_eq!(identity.email, "new@hospital.test");
        assert_eq!(fx.controller.snapshot().await.flow, AuthFlow::Authenticated);
    }

    #[tokio::test]
    async fn resend_success_raises_a_transient_notice() {
        let fx = fixture();
        fx.stub.stub_sign_up(Ok(SignUpOutcome::VerificationRequired {
            email: "new@hospital.test".to_string(),
        }));
        fx.controller.sign_up(&sign_up_form()).await.unwrap();

        fx.controller.resend_otp().await.unwrap();
        assert!(fx.controller.take_notice().await.is_some());
        // Consumed on read.
        assert!(fx.controller.take_notice().await.is_none());
    }

    #[tokio::test]
    async fn login_failure_returns_the_flow_to_anonymous_with_the_gateway_message() {
        let fx = fixture();
        fx.stub
            .stub_sign_in(Err(HmsError::Auth("Invalid login credentials".to_string())));

        let form = LoginForm {
            email: "jane@hospital.test".to_string(),
            password: "bad".to_string(),
            remember: false,
        };
        assert!(fx.controller.login(&form).await.is_err());
        let snap = fx.controller.snapshot().await;
        assert_eq!(snap.flow, AuthFlow::Anonymous);
        assert_eq!(snap.error.as_deref(), Some("Invalid login credentials"));
    }

    #[tokio::test]
    async fn remember_me_round_trips_the_credential_slots() {
        let fx = fixture();
        fx.stub
            .stub_sign_in(Ok(fx.stub.session_for("jane@hospital.test")));

        let form = LoginForm {
            email: "jane@hospital.test".to_string(),
            password: "pw".to_string(),
            remember: true,
        };
        fx.controller.login(&form).await.unwrap();
        let remembered = fx.controller.remembered().unwrap();
        assert_eq!(remembered.email, "jane@hospital.test");
        assert_eq!(remembered.password, "pw");

        // A later login without the toggle clears the slots.
        fx.stub
            .stub_sign_in(Ok(fx.stub.session_for("jane@hospital.test")));
        let form = LoginForm {
            remember: false,
            ..form
        };
        fx.controller.login(&form).await.unwrap();
        assert!(fx.controller.remembered().is_none());
    }
}
