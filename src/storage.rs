//! Persistence for the task lists.
//!
//! The whole state is one JSON document stored under [`STORAGE_KEY`] in a
//! key-value store. Reads never fail from the caller's point of view: a
//! missing, unreadable or malformed document loads as empty lists.

use crate::error::Result;
use crate::task::Task;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const STORAGE_KEY: &str = "todo-garden-data";

/// A string-valued key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes to `<key>.json.tmp` and renames it over the document, so a
    /// failed write never leaves a truncated file behind.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Both task lists, newest first.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TaskData {
    pub pending: Vec<Task>,
    pub completed: Vec<Task>,
}

/// Decodes a stored document.
///
/// `{"pending": [..], "completed": [..]}` is the current shape; a bare array
/// is a legacy pending list. Entries that are not tasks are dropped one by
/// one. Any other shape, or a parse error, gives empty lists.
pub fn decode_task_data(raw: &str) -> TaskData {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("discarding unreadable task data: {}", err);
            return TaskData::default();
        }
    };

    match value {
        Value::Array(entries) => {
            tracing::debug!(count = entries.len(), "loaded legacy task array");
            normalize(TaskData {
                pending: decode_entries(entries),
                completed: Vec::new(),
            })
        }
        Value::Object(mut map) => match (map.remove("pending"), map.remove("completed")) {
            (Some(Value::Array(pending)), Some(Value::Array(completed))) => normalize(TaskData {
                pending: decode_entries(pending),
                completed: decode_entries(completed),
            }),
            _ => {
                tracing::warn!("discarding task data without pending/completed lists");
                TaskData::default()
            }
        },
        _ => {
            tracing::warn!("discarding task data of unexpected shape");
            TaskData::default()
        }
    }
}

fn decode_entries(entries: Vec<Value>) -> Vec<Task> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Task>(entry) {
            Ok(task) => Some(task),
            Err(err) => {
                tracing::warn!("dropping unreadable task entry: {}", err);
                None
            }
        })
        .collect()
}

/// Reads the task lists from `store`, falling back to empty lists.
pub fn load_task_data(store: &impl KeyValueStore) -> TaskData {
    match store.get(STORAGE_KEY) {
        Ok(Some(raw)) if !raw.trim().is_empty() => decode_task_data(&raw),
        Ok(_) => {
            tracing::debug!("no stored tasks");
            TaskData::default()
        }
        Err(err) => {
            tracing::warn!("failed to read stored tasks: {}", err);
            TaskData::default()
        }
    }
}

pub fn persist_task_data(store: &mut impl KeyValueStore, data: &TaskData) -> Result<()> {
    let json = serde_json::to_string(data)?;
    store.set(STORAGE_KEY, &json)?;
    tracing::debug!(
        pending = data.pending.len(),
        completed = data.completed.len(),
        "persisted tasks"
    );
    Ok(())
}

/// Makes completion flags match list membership and drops duplicate ids.
fn normalize(data: TaskData) -> TaskData {
    let TaskData {
        mut pending,
        mut completed,
    } = data;
    let before = pending.len() + completed.len();

    let mut seen = HashSet::new();
    pending.retain(|task| seen.insert(task.id.clone()));
    completed.retain(|task| seen.insert(task.id.clone()));

    let dropped = before - pending.len() - completed.len();
    if dropped > 0 {
        tracing::warn!(dropped, "dropped tasks with duplicate ids");
    }

    TaskData {
        pending: pending.into_iter().map(Task::restore).collect(),
        completed: completed
            .into_iter()
            .map(|task| Task {
                completed: true,
                ..task
            })
            .collect(),
    }
}
