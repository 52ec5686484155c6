// session/src/lib.rs
//
// Session and authentication layer: the process-wide identity store, the
// login/signup/OTP flow controller, and the remembered-credentials slots.
// Everything network-shaped is delegated to the Gateway's auth interface.

pub mod credentials;
pub mod flow;
pub mod store;

#[cfg(test)]
pub(crate) mod test_stub;

pub use credentials::{CredentialStore, RememberedCredentials};
pub use flow::{AuthFlow, AuthFlowController, FlowSnapshot, LoginForm, SignUpForm, ROLES};
pub use store::{SessionSnapshot, SessionStore};
