// models/src/medical/appointment.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::HmsError;

/// Lifecycle of an appointment. Unlike the patient status, this one is a
/// closed set with explicit transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    /// A pending appointment can be confirmed, anything not yet cancelled
    /// can be cancelled, and `Cancelled` is terminal. There is no way back
    /// to `Pending`.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = HmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(AppointmentStatus::Pending),
            "Confirmed" => Ok(AppointmentStatus::Confirmed),
            "Cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(HmsError::Validation(format!(
                "Unknown appointment status: {}",
                other
            ))),
        }
    }
}

/// A row of the `appointments` table. Patient linkage is by display name
/// only; the schema carries no foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_time: String,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub room: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new appointment. It carries no status field:
/// every appointment starts `Pending`, whatever the form tried to set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_time: String,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub room: String,
}

impl NewAppointment {
    /// The JSON row sent to the Gateway, with status pinned to `Pending`.
    pub fn into_row(self) -> Value {
        let mut row = serde_json::to_value(&self)
            .unwrap_or_else(|_| Value::Object(Default::default()));
        row["status"] = Value::String(AppointmentStatus::Pending.as_str().to_string());
        row
    }
}
