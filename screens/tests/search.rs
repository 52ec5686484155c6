// screens/tests/search.rs
//
// Debounced search-as-you-type and the request-sequencing guard, run on a
// paused clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use gateway::testing::InMemoryTables;
use gateway::{SelectQuery, TableApi};
use models::{HmsError, HmsResult};
use screens::{PatientsScreen, PATIENTS_TABLE};

fn patient_row(name: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "full_name": name,
        "email": null,
        "gender": "Female",
        "age": 34,
        "blood_group": "A+",
        "last_visit": "2026-02-10",
        "status": "Out-patient",
        "created_at": "2026-02-10T08:00:00Z",
        "updated_at": "2026-02-10T08:00:00Z",
    })
}

#[tokio::test(start_paused = true)]
async fn search_matches_substrings_case_insensitively() {
    let tables = Arc::new(InMemoryTables::new());
    tables.seed(
        PATIENTS_TABLE,
        vec![patient_row("Alice Thompson"), patient_row("Robert Wilson")],
    );
    let screen = PatientsScreen::new(tables);
    screen.mount().await;
    assert_eq!(screen.state().rows.len(), 2);

    screen.set_search("ali");
    tokio::time::sleep(Duration::from_millis(400)).await;

    let rows = screen.state().rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].full_name, "Alice Thompson");
}

#[tokio::test(start_paused = true)]
async fn a_burst_of_keystrokes_issues_a_single_trailing_fetch() {
    let tables = Arc::new(InMemoryTables::new());
    tables.seed(PATIENTS_TABLE, vec![patient_row("Alice Thompson")]);
    let screen = PatientsScreen::new(tables.clone());
    screen.mount().await;
    assert_eq!(tables.select_calls(), 1);

    screen.set_search("a");
    tokio::time::sleep(Duration::from_millis(100)).await;
    screen.set_search("al");
    tokio::time::sleep(Duration::from_millis(100)).await;
    screen.set_search("ali");
    tokio::time::sleep(Duration::from_millis(400)).await;

    // Only the trailing keystroke survived its debounce window.
    assert_eq!(tables.select_calls(), 2);
    assert_eq!(screen.state().search, "ali");
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_the_pending_fetch() {
    let tables = Arc::new(InMemoryTables::new());
    let screen = PatientsScreen::new(tables.clone());
    screen.mount().await;

    screen.set_search("ali");
    screen.unmount();
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(tables.select_calls(), 1);
}

/// Select-only double whose responses arrive per a script of
/// (delay, rows) entries, in call order.
struct ScriptedTables {
    script: Mutex<VecDeque<(Duration, Vec<Value>)>>,
}

#[async_trait]
impl TableApi for ScriptedTables {
    async fn select(&self, _table: &str, _query: &SelectQuery) -> HmsResult<Vec<Value>> {
        let (delay, rows) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted");
        tokio::time::sleep(delay).await;
        Ok(rows)
    }

    async fn count(&self, _table: &str) -> HmsResult<u64> {
        Err(HmsError::DataAccess("not scripted".to_string()))
    }

    async fn insert(&self, _table: &str, _row: Value) -> HmsResult<Value> {
        Err(HmsError::DataAccess("not scripted".to_string()))
    }

    async fn update(&self, _table: &str, _id: Uuid, _patch: Value) -> HmsResult<()> {
        Err(HmsError::DataAccess("not scripted".to_string()))
    }

    async fn delete(&self, _table: &str, _id: Uuid) -> HmsResult<()> {
        Err(HmsError::DataAccess("not scripted".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn a_slow_stale_response_never_overwrites_a_newer_one() {
    let tables = Arc::new(ScriptedTables {
        script: Mutex::new(VecDeque::from([
            // First request: slow, and answering the outdated filter.
            (Duration::from_millis(500), vec![patient_row("Alice Thompson")]),
            // Second request: fast, the one the user is waiting on.
            (Duration::from_millis(10), vec![patient_row("Robert Wilson")]),
        ])),
    });
    let screen = PatientsScreen::new(tables);

    let first = screen.refresh();
    let second = screen.refresh();
    tokio::join!(first, second);

    let rows = screen.state().rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].full_name, "Robert Wilson");
}
