// screens/src/appointments.rs

use std::sync::{Arc, Mutex, Weak};

use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use gateway::{SelectQuery, TableApi};
use models::{Appointment, AppointmentStatus, HmsError, HmsResult, NewAppointment};

use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::seq::RequestSeq;
use crate::APPOINTMENTS_TABLE;

/// Raw scheduling form. It may carry a status (some form variants render
/// the selector), but creation ignores it: every appointment starts
/// `Pending`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentForm {
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_time: String,
    pub appointment_type: String,
    pub room: String,
    pub status: Option<String>,
}

impl AppointmentForm {
    pub fn validate(&self) -> HmsResult<NewAppointment> {
        if self.patient_name.trim().is_empty() {
            return Err(HmsError::Validation("Patient name is required".to_string()));
        }
        if self.doctor_name.trim().is_empty() {
            return Err(HmsError::Validation("Doctor name is required".to_string()));
        }
        if self.appointment_time.trim().is_empty() {
            return Err(HmsError::Validation(
                "Appointment time is required".to_string(),
            ));
        }

        Ok(NewAppointment {
            patient_name: self.patient_name.trim().to_string(),
            doctor_name: self.doctor_name.trim().to_string(),
            appointment_time: self.appointment_time.trim().to_string(),
            appointment_type: self.appointment_type.trim().to_string(),
            room: self.room.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentsState {
    pub rows: Vec<Appointment>,
    pub loading: bool,
    pub search: String,
    pub error: Option<String>,
    pub modal_open: bool,
    pub form: AppointmentForm,
    pub pending_remove: Option<Uuid>,
}

/// The appointments screen: searchable list, scheduling modal, status
/// transitions, confirm-gated delete.
pub struct AppointmentsScreen {
    tables: Arc<dyn TableApi>,
    state: Mutex<AppointmentsState>,
    seq: RequestSeq,
    debounce: Mutex<Debouncer>,
    // Handle back to ourselves for the debounced fetch task.
    this: Weak<AppointmentsScreen>,
}

impl AppointmentsScreen {
    pub fn new(tables: Arc<dyn TableApi>) -> Arc<Self> {
        Arc::new_cyclic(|this| AppointmentsScreen {
            tables,
            state: Mutex::new(AppointmentsState::default()),
            seq: RequestSeq::default(),
            debounce: Mutex::new(Debouncer::new(SEARCH_DEBOUNCE)),
            this: this.clone(),
        })
    }

    pub fn state(&self) -> AppointmentsState {
        self.state.lock().unwrap().clone()
    }

    pub async fn mount(&self) {
        self.refresh().await;
    }

    pub fn unmount(&self) {
        self.debounce.lock().unwrap().cancel();
    }

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

    pub async fn refresh(&self) {
        let token = self.seq.begin();
        let search = {
            let mut state = self.state.lock().unwrap();
            state.loading = true;
            state.search.clone()
        };

        let query = SelectQuery::new()
            .pattern("patient_name", search)
            .order_desc("created_at");
        let outcome = self
            .tables
            .select(APPOINTMENTS_TABLE, &query)
            .await
            .and_then(parse_rows);

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
                warn!(error = %err, "appointment list fetch failed");
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

    pub fn set_form(&self, form: AppointmentForm) {
        self.state.lock().unwrap().form = form;
    }

    /// Books the appointment on the form. Whatever status the form tried
    /// to carry, the stored row starts `Pending`.
    pub async fn create(&self) -> HmsResult<Appointment> {
        let form = self.state.lock().unwrap().form.clone();
        let new_appointment = match form.validate() {
            Ok(new_appointment) => new_appointment,
            Err(err) => {
                self.state.lock().unwrap().error = Some(err.message().to_string());
                return Err(err);
            }
        };

        match self
            .tables
            .insert(APPOINTMENTS_TABLE, new_appointment.into_row())
            .await
        {
            Err(err) => {
                self.state.lock().unwrap().error = Some(err.message().to_string());
                Err(err)
            }
            Ok(stored) => {
                {
                    let mut state = self.state.lock().unwrap();
                    state.modal_open = false;
                    state.form = AppointmentForm::default();
                    state.error = None;
                }
                self.refresh().await;
                Ok(serde_json::from_value(stored)?)
            }
        }
    }

    /// Single-field status update. Illegal transitions are rejected before
    /// any call; a Gateway failure is logged only — the prior status stays
    /// on screen and no message is raised, matching the original behavior.
    pub async fn update_status(&self, id: Uuid, new_status: AppointmentStatus) -> HmsResult<()> {
        let current = {
            let state = self.state.lock().unwrap();
            state.rows.iter().find(|row| row.id == id).map(|row| row.status)
        };
        let Some(current) = current else {
            return Err(HmsError::Validation(format!(
                "No appointment {} on this screen",
                id
            )));
        };
        if !current.can_transition_to(new_status) {
            return Err(HmsError::Validation(format!(
                "A {} appointment cannot become {}",
                current, new_status
            )));
        }

        match self
            .tables
            .update(
                APPOINTMENTS_TABLE,
                id,
                json!({ "status": new_status.as_str() }),
            )
            .await
        {
            Err(err) => {
                warn!(error = %err, %id, "status update failed");
                Err(err)
            }
            Ok(()) => {
                self.refresh().await;
                Ok(())
            }
        }
    }

    pub fn request_remove(&self, id: Uuid) {
        self.state.lock().unwrap().pending_remove = Some(id);
    }

    pub fn cancel_remove(&self) {
        self.state.lock().unwrap().pending_remove = None;
    }

    pub async fn confirm_remove(&self) -> HmsResult<()> {
        let Some(id) = self.state.lock().unwrap().pending_remove.take() else {
            return Err(HmsError::Validation(
                "No deletion awaiting confirmation".to_string(),
            ));
        };

        match self.tables.delete(APPOINTMENTS_TABLE, id).await {
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

fn parse_rows(rows: Vec<Value>) -> HmsResult<Vec<Appointment>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(HmsError::from))
        .collect()
}
