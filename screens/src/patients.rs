// screens/src/patients.rs

use std::sync::{Arc, Mutex, Weak};

use chrono::Utc;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use gateway::{SelectQuery, TableApi};
use models::medical::patient::STATUS_OUT_PATIENT;
use models::{HmsError, HmsResult, NewPatient, Patient};

use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::seq::RequestSeq;
use crate::PATIENTS_TABLE;

/// Raw Add-Patient form fields, as typed. Parsing and validation happen on
/// submit; until then everything is plain text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientForm {
    pub full_name: String,
    pub email: String,
    pub gender: String,
    pub age: String,
    pub blood_group: String,
    pub status: String,
}

impl PatientForm {
    /// The insert payload, or the first validation failure. `last_visit`
    /// is stamped with today's date; an empty status takes the default.
    pub fn validate(&self) -> HmsResult<NewPatient> {
        if self.full_name.trim().is_empty() {
            return Err(HmsError::Validation("Patient name is required".to_string()));
        }
        let age: i32 = self
            .age
            .trim()
            .parse()
            .map_err(|_| HmsError::Validation("Age must be a number".to_string()))?;
        if !(0..=130).contains(&age) {
            return Err(HmsError::Validation(
                "Age must be between 0 and 130".to_string(),
            ));
        }
        if self.gender.trim().is_empty() {
            return Err(HmsError::Validation("Gender is required".to_string()));
        }
        if self.blood_group.trim().is_empty() {
            return Err(HmsError::Validation("Blood group is required".to_string()));
        }

        let status = if self.status.trim().is_empty() {
            STATUS_OUT_PATIENT.to_string()
        } else {
            self.status.trim().to_string()
        };
        let email = match self.email.trim() {
            "" => None,
            value => Some(value.to_string()),
        };

        Ok(NewPatient {
            full_name: self.full_name.trim().to_string(),
            email,
            gender: self.gender.trim().to_string(),
            age,
            blood_group: self.blood_group.trim().to_string(),
            last_visit: Utc::now().date_naive(),
            status,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatientsState {
    pub rows: Vec<Patient>,
    pub loading: bool,
    pub search: String,
    pub error: Option<String>,
    pub modal_open: bool,
    pub form: PatientForm,
    pub pending_remove: Option<Uuid>,
}

/// The patient directory: a searchable list, an Add-Patient modal, and a
/// confirm-gated delete. Patients have no edit path; the only mutations
/// are insert and delete.
pub struct PatientsScreen {
    tables: Arc<dyn TableApi>,
    state: Mutex<PatientsState>,
    seq: RequestSeq,
    debounce: Mutex<Debouncer>,
    // Handle back to ourselves for the debounced fetch task.
    this: Weak<PatientsScreen>,
}

impl PatientsScreen {
    pub fn new(tables: Arc<dyn TableApi>) -> Arc<Self> {
        Arc::new_cyclic(|this| PatientsScreen {
            tables,
            state: Mutex::new(PatientsState::default()),
            seq: RequestSeq::default(),
            debounce: Mutex::new(Debouncer::new(SEARCH_DEBOUNCE)),
            this: this.clone(),
        })
    }

    pub fn state(&self) -> PatientsState {
        self.state.lock().unwrap().clone()
    }

    pub async fn mount(&self) {
        self.refresh().await;
    }

    /// Screen teardown: nothing scheduled survives the screen.
    pub fn unmount(&self) {
        self.debounce.lock().unwrap().cancel();
    }

    /// Records the keystroke and restarts the debounce timer; the fetch
    /// itself runs once the timer survives [`SEARCH_DEBOUNCE`].
    pub fn set_search(&self, term: impl Into<String>) {
        self.state.lock().unwrap().search = term.into();
        let Some(screen) = self.this.upgrade() else {
            return;
        };
        self.debounce
            .lock()
            .unwrap()
            .schedule(async move { screen.refresh().await });
    }

    /// Full re-fetch of the visible collection. A response that lost the
    /// race to a newer request is dropped on the floor.
    pub async fn refresh(&self) {
        let token = self.seq.begin();
        let search = {
            let mut state = self.state.lock().unwrap();
            state.loading = true;
            state.search.clone()
        };

        let query = SelectQuery::new()
            .pattern("full_name", search)
            .order_desc("created_at");
        let outcome = self.tables.select(PATIENTS_TABLE, &query).await.and_then(parse_rows);

        if !self.seq.is_current(token) {
            return;
        }
        let mut state = self.state.lock().unwrap();
        state.loading = false;
        match outcome {
            Ok(rows) => {
                state.rows = rows;
                state.error = None;
            }
            Err(err) => {
                warn!(error = %err, "patient list fetch failed");
                state.error = Some(err.message().to_string());
            }
        }
    }

    pub fn open_modal(&self) {
        let mut state = self.state.lock().unwrap();
        state.modal_open = true;
        state.error = None;
    }

    pub fn close_modal(&self) {
        self.state.lock().unwrap().modal_open = false;
    }

    pub fn set_form(&self, form: PatientForm) {
        self.state.lock().unwrap().form = form;
    }

    /// Submits the Add-Patient form. Validation failures and Gateway
    /// errors both leave the modal open with the entered data intact; on
    /// success the modal closes, the form resets, and the list re-fetches.
    pub async fn create(&self) -> HmsResult<Patient> {
        let form = self.state.lock().unwrap().form.clone();
        let new_patient = match form.validate() {
            Ok(new_patient) => new_patient,
            Err(err) => {
                self.state.lock().unwrap().error = Some(err.message().to_string());
                return Err(err);
            }
        };

        let row = serde_json::to_value(&new_patient)?;
        match self.tables.insert(PATIENTS_TABLE, row).await {
            Err(err) => {
                self.state.lock().unwrap().error = Some(err.message().to_string());
                Err(err)
            }
            Ok(stored) => {
                {
                    let mut state = self.state.lock().unwrap();
                    state.modal_open = false;
                    state.form = PatientForm::default();
                    state.error = None;
                }
                self.refresh().await;
                Ok(serde_json::from_value(stored)?)
            }
        }
    }

    /// First half of the delete: nothing is issued until the user
    /// confirms.
    pub fn request_remove(&self, id: Uuid) {
        self.state.lock().unwrap().pending_remove = Some(id);
    }

    pub fn cancel_remove(&self) {
        self.state.lock().unwrap().pending_remove = None;
    }

    /// Issues the delete the user confirmed. On failure the Gateway's
    /// message is surfaced and the displayed collection stays as it was.
    pub async fn confirm_remove(&self) -> HmsResult<()> {
        let Some(id) = self.state.lock().unwrap().pending_remove.take() else {
            return Err(HmsError::Validation(
                "No deletion awaiting confirmation".to_string(),
            ));
        };

        match self.tables.delete(PATIENTS_TABLE, id).await {
            Err(err) => {
                self.state.lock().unwrap().error = Some(err.message().to_string());
                Err(err)
            }
            Ok(()) => {
                self.refresh().await;
                Ok(())
            }
        }
    }
}

fn parse_rows(rows: Vec<Value>) -> HmsResult<Vec<Patient>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(HmsError::from))
        .collect()
}
