// gateway/src/testing.rs
//
// In-memory stand-in for the Gateway's table interface, used by this
// crate's tests and exported to the rest of the workspace behind the
// `test-utils` feature.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use models::{HmsError, HmsResult};

use crate::query::SelectQuery;
use crate::TableApi;

/// Tables as plain vectors of JSON rows. Inserts fill in a generated id
/// and timestamps the way the hosted schema would; `fail_next` arms a
/// one-shot failure for a named operation.
#[derive(Default)]
pub struct InMemoryTables {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failures: Mutex<HashMap<&'static str, HmsError>>,
    select_calls: AtomicU64,
}

impl InMemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Arms a one-shot failure for the next call of `op`
    /// ("select" | "count" | "insert" | "update" | "delete").
    pub fn fail_next(&self, op: &'static str, err: HmsError) {
        self.failures.lock().unwrap().insert(op, err);
    }

    /// How many selects have been issued; lets tests assert that the
    /// debounce collapsed a burst of keystrokes into one fetch.
    pub fn select_calls(&self) -> u64 {
        self.select_calls.load(Ordering::SeqCst)
    }

    fn take_failure(&self, op: &'static str) -> Option<HmsError> {
        self.failures.lock().unwrap().remove(op)
    }

    fn matches(row: &Value, column: &str, term: &str) -> bool {
        row.get(column)
            .and_then(Value::as_str)
            .map(|v| v.to_lowercase().contains(&term.to_lowercase()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl TableApi for InMemoryTables {
    async fn select(&self, table: &str, query: &SelectQuery) -> HmsResult<Vec<Value>> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_failure("select") {
            return Err(err);
        }
        let mut rows = self.rows(table);
        if let Some((column, term)) = query.pattern_parts() {
            rows.retain(|row| Self::matches(row, column, term));
        }
        if let Some(column) = query.order_column() {
            // RFC 3339 strings order lexically, which is all the tests need.
            rows.sort_by(|a, b| {
                let ka = a.get(column).and_then(Value::as_str).unwrap_or_default();
                let kb = b.get(column).and_then(Value::as_str).unwrap_or_default();
                kb.cmp(ka)
            });
        }
        if let Some(limit) = query.limit_value() {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn count(&self, table: &str) -> HmsResult<u64> {
        if let Some(err) = self.take_failure("count") {
            return Err(err);
        }
        Ok(self.rows(table).len() as u64)
    }

    async fn insert(&self, table: &str, mut row: Value) -> HmsResult<Value> {
        if let Some(err) = self.take_failure("insert") {
            return Err(err);
        }
        let now = Utc::now().to_rfc3339();
        let obj = row.as_object_mut().ok_or_else(|| {
            HmsError::DataAccess("Insert payload is not a JSON object".to_string())
        })?;
        obj.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        obj.entry("created_at")
            .or_insert_with(|| Value::String(now.clone()));
        obj.entry("updated_at").or_insert_with(|| Value::String(now));

        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: Uuid, patch: Value) -> HmsResult<()> {
        if let Some(err) = self.take_failure("update") {
            return Err(err);
        }
        let id = id.to_string();
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let row = rows
            .iter_mut()
            .find(|row| row.get("id").and_then(Value::as_str) == Some(id.as_str()))
            .ok_or_else(|| HmsError::DataAccess(format!("No {} row with id {}", table, id)))?;
        if let (Some(target), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
            target.insert(
                "updated_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: Uuid) -> HmsResult<()> {
        if let Some(err) = self.take_failure("delete") {
            return Err(err);
        }
        let id = id.to_string();
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let before = rows.len();
        rows.retain(|row| row.get("id").and_then(Value::as_str) != Some(id.as_str()));
        if rows.len() == before {
            return Err(HmsError::DataAccess(format!(
                "No {} row with id {} to delete",
                table, id
            )));
        }
        Ok(())
    }
}
