//! In-memory stand-ins for the Connect API and the destination sheet.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::client::{ConnectApi, DetailSource, ProfileSource};
use crate::error::{Result, SyncError};
use crate::sheets::RowStore;

/// Canned Connect responses. Anything not registered answers 404.
#[derive(Default)]
pub struct FakeConnect {
    activities: Option<Vec<Value>>,
    details: HashMap<(DetailSource, u64), Value>,
    profiles: HashMap<ProfileSource, Value>,
    catalogs: HashMap<u64, Value>,
    detail_log: Mutex<Vec<(DetailSource, u64)>>,
    profile_log: Mutex<usize>,
    catalog_log: Mutex<usize>,
}

impl FakeConnect {
    pub fn with_activities(mut self, activities: Vec<Value>) -> Self {
        self.activities = Some(activities);
        self
    }

    pub fn with_detail(mut self, source: DetailSource, activity_id: u64, payload: Value) -> Self {
        self.details.insert((source, activity_id), payload);
        self
    }

    pub fn with_profile(mut self, source: ProfileSource, payload: Value) -> Self {
        self.profiles.insert(source, payload);
        self
    }

    pub fn with_catalog(mut self, profile_number: u64, payload: Value) -> Self {
        self.catalogs.insert(profile_number, payload);
        self
    }

    pub fn detail_calls(&self) -> Vec<(DetailSource, u64)> {
        self.detail_log.lock().unwrap().clone()
    }

    pub fn profile_calls(&self) -> usize {
        *self.profile_log.lock().unwrap()
    }

    pub fn catalog_calls(&self) -> usize {
        *self.catalog_log.lock().unwrap()
    }
}

#[async_trait]
impl ConnectApi for FakeConnect {
    async fn recent_activities(&self, _start: u32, limit: u32) -> Result<Vec<Value>> {
        let activities = self
            .activities
            .clone()
            .ok_or_else(|| SyncError::NotFound("activities".to_string()))?;
        Ok(activities.into_iter().take(limit as usize).collect())
    }

    async fn activity_payload(&self, source: DetailSource, activity_id: u64) -> Result<Value> {
        self.detail_log.lock().unwrap().push((source, activity_id));
        self.details
            .get(&(source, activity_id))
            .cloned()
            .ok_or_else(|| SyncError::NotFound(source.path(activity_id)))
    }

    async fn profile_payload(&self, source: ProfileSource) -> Result<Value> {
        *self.profile_log.lock().unwrap() += 1;
        self.profiles
            .get(&source)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(source.path().to_string()))
    }

    async fn gear_catalog(&self, user_profile_number: u64) -> Result<Value> {
        *self.catalog_log.lock().unwrap() += 1;
        self.catalogs
            .get(&user_profile_number)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(format!("catalog {}", user_profile_number)))
    }
}

/// Rows held in memory; the first cell of each row is the key column.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Vec<Value>>>,
    reject: HashSet<String>,
    unreadable: bool,
}

impl MemoryStore {
    pub fn with_ids(ids: &[&str]) -> Self {
        let rows = ids.iter().map(|id| vec![Value::from(*id)]).collect();
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// Appends whose first cell is `id` fail
    pub fn rejecting(mut self, id: &str) -> Self {
        self.reject.insert(id.to_string());
        self
    }

    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }

    pub fn rows(&self) -> Vec<Vec<Value>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn first_column(&self) -> Result<Vec<String>> {
        if self.unreadable {
            return Err(SyncError::sheets("read rows failed (403)"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|row| row.first().and_then(Value::as_str).unwrap_or_default().to_string())
            .collect())
    }

    async fn append_row(&self, cells: &[Value]) -> Result<()> {
        let key = cells.first().and_then(Value::as_str).unwrap_or_default();
        if self.reject.contains(key) {
            return Err(SyncError::sheets(format!("append row failed for {}", key)));
        }
        self.rows.lock().unwrap().push(cells.to_vec());
        Ok(())
    }
}
