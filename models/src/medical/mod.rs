// models/src/medical/mod.rs

pub mod appointment;
pub mod patient;
pub mod profile;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use patient::{NewPatient, Patient};
pub use profile::{Profile, ProfilePatch};
