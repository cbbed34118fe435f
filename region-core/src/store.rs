//! Injected key-value storage for non-authoritative display data
//!
//! Region display names and the known-task list are kept outside the core's pure functions;
//! callers pick the backing store and call `load`/`save` explicitly.

use crate::{region::RegionId, types::TaskId, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const REGION_NAME_PREFIX: &str = "region-name";
const TASKS_KEY: &str = "tasks";

/// Minimal string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn save(&self, key: &str, value: String) -> Result<()>;

    /// Delete a value
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn save(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Display names keyed by the packed region id
#[derive(Debug, Clone)]
pub struct RegionLabels<S> {
    store: S,
}

impl<S: KeyValueStore> RegionLabels<S> {
    /// Wrap a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn key(id: &RegionId) -> String {
        format!("{}:{}", REGION_NAME_PREFIX, id.encode())
    }

    /// Name for `id`, if one was saved
    pub fn load(&self, id: &RegionId) -> Result<Option<String>> {
        self.store.load(&Self::key(id))
    }

    /// Save a name for `id`
    pub fn save(&self, id: &RegionId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        debug!("Labelling region {} as {:?}", id, name);
        self.store.save(&Self::key(id), name)
    }

    /// Forget the name for `id`
    pub fn remove(&self, id: &RegionId) -> Result<()> {
        self.store.remove(&Self::key(id))
    }
}

/// A task the user has registered for assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Parachain id
    pub id: TaskId,
    /// Display name
    pub name: String,
}

/// Known tasks, stored as one JSON list
#[derive(Debug, Clone)]
pub struct TaskRegistry<S> {
    store: S,
}

impl<S: KeyValueStore> TaskRegistry<S> {
    /// Wrap a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All saved tasks
    pub fn load(&self) -> Result<Vec<TaskEntry>> {
        match self.store.load(TASKS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the saved task list
    pub fn save(&self, tasks: &[TaskEntry]) -> Result<()> {
        self.store.save(TASKS_KEY, serde_json::to_string(tasks)?)
    }

    /// Add or rename a task
    pub fn upsert(&self, entry: TaskEntry) -> Result<()> {
        let mut tasks = self.load()?;
        match tasks.iter_mut().find(|t| t.id == entry.id) {
            Some(existing) => existing.name = entry.name,
            None => tasks.push(entry),
        }
        debug!("Task registry now holds {} tasks", tasks.len());
        self.save(&tasks)
    }
}
