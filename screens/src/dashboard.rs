// screens/src/dashboard.rs

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::warn;

use gateway::{SelectQuery, TableApi};
use models::{Appointment, HmsError, HmsResult};

use crate::{APPOINTMENTS_TABLE, PATIENTS_TABLE};

/// How many of the newest appointments the dashboard table shows.
const RECENT_LIMIT: u32 = 5;

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub patient_count: u64,
    pub recent_appointments: Vec<Appointment>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Aggregate summary: a count-only query on patients plus the five newest
/// appointments. Every mount re-queries; nothing is cached between
/// visits.
pub struct DashboardScreen {
    tables: Arc<dyn TableApi>,
    state: Mutex<DashboardState>,
}

impl DashboardScreen {
    pub fn new(tables: Arc<dyn TableApi>) -> Self {
        DashboardScreen {
            tables,
            state: Mutex::new(DashboardState::default()),
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state.lock().unwrap().clone()
    }

    pub async fn mount(&self) {
        self.state.lock().unwrap().loading = true;

        let count = self.tables.count(PATIENTS_TABLE).await;
        let recent_query = SelectQuery::new()
            .order_desc("created_at")
            .limit(RECENT_LIMIT);
        let recent = self
            .tables
            .select(APPOINTMENTS_TABLE, &recent_query)
            .await
            .and_then(parse_rows);

        let mut state = self.state.lock().unwrap();
        state.loading = false;
        state.error = None;
        match count {
            Ok(total) => state.patient_count = total,
            Err(err) => {
                warn!(error = %err, "patient count failed");
                state.error = Some(err.message().to_string());
            }
        }
        match recent {
            // An empty table is an empty list; the placeholder is the
            // renderer's business.
            Ok(rows) => state.recent_appointments = rows,
            Err(err) => {
                warn!(error = %err, "recent appointments fetch failed");
                state.error = Some(err.message().to_string());
            }
        }
    }
}

fn parse_rows(rows: Vec<Value>) -> HmsResult<Vec<Appointment>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(HmsError::from))
        .collect()
}
