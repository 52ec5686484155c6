// models/src/medical/patient.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known values of the `status` column. The column is free-form text
/// with a server-side default, not an enum; these are the values the
/// screens render badges for.
pub const STATUS_IN_PATIENT: &str = "In-patient";
pub const STATUS_OUT_PATIENT: &str = "Out-patient";
pub const STATUS_DISCHARGED: &str = "Discharged";

/// A row of the `patients` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub gender: String,
    pub age: i32,
    pub blood_group: String,
    pub last_visit: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new patient. The id and timestamps are
/// server-generated; `last_visit` is stamped with the creation date by the
/// screen that submits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub full_name: String,
    pub email: Option<String>,
    pub gender: String,
    pub age: i32,
    pub blood_group: String,
    pub last_visit: NaiveDate,
    pub status: String,
}

impl NewPatient {
    pub fn default_status() -> String {
        STATUS_OUT_PATIENT.to_string()
    }
}
