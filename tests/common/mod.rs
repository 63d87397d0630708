//! Shared test support: an in-memory storage adapter
//!
//! Implements the full `Adapter` contract against a map of tables.
//! Like a real backend it assigns integer ids and timestamp columns on
//! save, so lifecycle tests can assert the engine never writes those
//! fields itself. Call counters let tests verify short-circuiting.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};

use modelkit::{Adapter, ModelError, Query, Result};

#[derive(Default)]
struct TableData {
    rows: Vec<Map<String, Value>>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryAdapter {
    tables: Mutex<HashMap<String, TableData>>,
    save_calls: AtomicUsize,
    update_calls: AtomicUsize,
    destroy_calls: AtomicUsize,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn destroy_count(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }

    /// Raw stored rows, exactly as the adapter received them
    pub fn rows(&self, table: &str) -> Vec<Map<String, Value>> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map(|data| data.rows.clone())
            .unwrap_or_default()
    }
}

fn now() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339())
}

fn is_missing(row: &Map<String, Value>, column: &str) -> bool {
    row.get(column).is_none_or(Value::is_null)
}

fn matches(row: &Map<String, Value>, query: &Query) -> bool {
    query
        .filter
        .iter()
        .all(|(column, expected)| row.get(column) == Some(expected))
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn save(&self, table: &str, record: &Value) -> Result<Value> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);

        let mut row = match record {
            Value::Object(map) => map.clone(),
            other => {
                return Err(ModelError::adapter(format!(
                    "expected an object row, got {}",
                    other
                )));
            }
        };

        let mut tables = self.tables.lock().unwrap();
        let data = tables.entry(table.to_string()).or_default();

        if is_missing(&row, "id") {
            data.next_id += 1;
            row.insert("id".to_string(), Value::from(data.next_id));
        }
        if is_missing(&row, "created_at") {
            row.insert("created_at".to_string(), now());
        }
        row.insert("updated_at".to_string(), now());

        let id = row.get("id").cloned();
        match data
            .rows
            .iter_mut()
            .find(|existing| existing.get("id") == id.as_ref())
        {
            Some(existing) => *existing = row.clone(),
            None => data.rows.push(row.clone()),
        }

        Ok(Value::Object(row))
    }

    async fn update(&self, table: &str, id: &Value, record: &Value) -> Result<Value> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let patch = match record {
            Value::Object(map) => map.clone(),
            other => {
                return Err(ModelError::adapter(format!(
                    "expected an object patch, got {}",
                    other
                )));
            }
        };

        let mut tables = self.tables.lock().unwrap();
        let data = tables
            .get_mut(table)
            .ok_or_else(|| ModelError::adapter(format!("no such table '{}'", table)))?;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row.get("id") == Some(id))
            .ok_or_else(|| ModelError::adapter(format!("no row with id {}", id)))?;

        for (column, value) in patch {
            row.insert(column, value);
        }
        row.insert("updated_at".to_string(), now());

        Ok(Value::Object(row.clone()))
    }

    async fn find(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let tables = self.tables.lock().unwrap();
        let rows = tables
            .get(table)
            .map(|data| data.rows.as_slice())
            .unwrap_or_default();

        let offset = query.offset.unwrap_or(0).max(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l.max(0) as usize);

        Ok(rows
            .iter()
            .filter(|row| matches(row, query))
            .skip(offset)
            .take(limit)
            .map(|row| Value::Object(row.clone()))
            .collect())
    }

    async fn find_one(&self, table: &str, query: &Query) -> Result<Option<Value>> {
        let tables = self.tables.lock().unwrap();
        let rows = tables
            .get(table)
            .map(|data| data.rows.as_slice())
            .unwrap_or_default();

        Ok(rows
            .iter()
            .find(|row| matches(row, query))
            .map(|row| Value::Object(row.clone())))
    }

    async fn destroy(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);

        let mut tables = self.tables.lock().unwrap();
        let Some(data) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut removed = Vec::new();
        data.rows.retain(|row| {
            if matches(row, query) {
                removed.push(Value::Object(row.clone()));
                false
            } else {
                true
            }
        });

        Ok(removed)
    }
}
