// session/src/test_stub.rs
//
// Hand-rolled AuthApi double for the tests in this crate: each call takes
// its next scripted result, and every call is recorded by name so tests
// can assert that no Gateway round trip happened.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use gateway::AuthApi;
use models::{
    AuthSession, AuthUser, HmsError, HmsResult, Profile, ProfilePatch, SignUpOutcome,
    SignUpRequest,
};

#[derive(Default)]
pub struct StubAuth {
    sign_in: Mutex<Option<HmsResult<AuthSession>>>,
    sign_up: Mutex<Option<HmsResult<SignUpOutcome>>>,
    current_session: Mutex<Option<HmsResult<Option<AuthSession>>>>,
    sign_out: Mutex<Option<HmsResult<()>>>,
    verify: Mutex<Option<HmsResult<AuthSession>>>,
    resend: Mutex<Option<HmsResult<()>>>,
    profile: Mutex<Option<Profile>>,
    profile_error: Mutex<Option<HmsError>>,
    update_profile: Mutex<Option<HmsResult<()>>>,
    calls: Mutex<Vec<String>>,
}

impl StubAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_for(&self, email: &str) -> AuthSession {
        AuthSession {
            access_token: "tok-test".to_string(),
            user: AuthUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
            },
        }
    }

    pub fn stub_sign_in(&self, result: HmsResult<AuthSession>) {
        *self.sign_in.lock().unwrap() = Some(result);
    }

    pub fn stub_sign_up(&self, result: HmsResult<SignUpOutcome>) {
        *self.sign_up.lock().unwrap() = Some(result);
    }

    pub fn stub_current_session(&self, result: HmsResult<Option<AuthSession>>) {
        *self.current_session.lock().unwrap() = Some(result);
    }

    pub fn stub_sign_out(&self, result: HmsResult<()>) {
        *self.sign_out.lock().unwrap() = Some(result);
    }

    pub fn stub_verify(&self, result: HmsResult<AuthSession>) {
        *self.verify.lock().unwrap() = Some(result);
    }

    pub fn stub_resend(&self, result: HmsResult<()>) {
        *self.resend.lock().unwrap() = Some(result);
    }

    pub fn stub_profile(&self, profile: Profile) {
        *self.profile.lock().unwrap() = Some(profile);
    }

    pub fn stub_profile_error(&self, err: HmsError) {
        *self.profile_error.lock().unwrap() = Some(err);
    }

    pub fn stub_update_profile(&self, result: HmsResult<()>) {
        *self.update_profile.lock().unwrap() = Some(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl AuthApi for StubAuth {
    async fn sign_in(&self, _email: &str, _password: &str) -> HmsResult<AuthSession> {
        self.record("sign_in");
        self.sign_in
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(HmsError::Auth("sign_in not stubbed".to_string())))
    }

    async fn sign_up(&self, _req: SignUpRequest) -> HmsResult<SignUpOutcome> {
        self.record("sign_up");
        self.sign_up
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(HmsError::Auth("sign_up not stubbed".to_string())))
    }

    async fn current_session(&self) -> HmsResult<Option<AuthSession>> {
        self.record("current_session");
        self.current_session
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(None))
    }

    async fn sign_out(&self) -> HmsResult<()> {
        self.record("sign_out");
        self.sign_out.lock().unwrap().take().unwrap_or(Ok(()))
    }

    async fn get_profile(&self, _user_id: Uuid) -> HmsResult<Option<Profile>> {
        self.record("get_profile");
        if let Some(err) = self.profile_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn update_profile(&self, _user_id: Uuid, _patch: ProfilePatch) -> HmsResult<()> {
        self.record("update_profile");
        self.update_profile.lock().unwrap().take().unwrap_or(Ok(()))
    }

    async fn verify_otp(&self, _email: &str, _code: &str) -> HmsResult<AuthSession> {
        self.record("verify_otp");
        self.verify
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(HmsError::Auth("verify_otp not stubbed".to_string())))
    }

    async fn resend_otp(&self, _email: &str) -> HmsResult<()> {
        self.record("resend_otp");
        self.resend.lock().unwrap().take().unwrap_or(Ok(()))
    }
}
