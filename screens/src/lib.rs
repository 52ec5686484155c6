// screens/src/lib.rs
//
// Controllers behind the entity screens. Each screen owns its view state
// (rows, loading flag, modal, inline error), talks to the Gateway's table
// interface, and re-fetches after every successful mutation; nothing is
// inserted optimistically.

pub mod appointments;
pub mod dashboard;
pub mod debounce;
pub mod guard;
pub mod patients;
mod seq;

pub use appointments::{AppointmentForm, AppointmentsScreen, AppointmentsState};
pub use dashboard::{DashboardScreen, DashboardState};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use guard::{resolve_path, resolve_route, Route, RouteDecision};
pub use patients::{PatientForm, PatientsScreen, PatientsState};

pub const PATIENTS_TABLE: &str = "patients";
pub const APPOINTMENTS_TABLE: &str = "appointments";
