// models/src/lib.rs

pub mod auth;
pub mod errors;
pub mod identity;
pub mod medical;

pub use auth::{AuthSession, AuthUser, SignUpOutcome, SignUpRequest};
pub use errors::{ErrorKind, HmsError, HmsResult};
pub use identity::{Identity, DEFAULT_ROLE};
pub use medical::{
    Appointment, AppointmentStatus, NewAppointment, NewPatient, Patient, Profile, ProfilePatch,
};
