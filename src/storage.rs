//! Persistence of the task collection in a local key-value store.
//!
//! The whole collection lives under one key as a versioned JSON envelope:
//!
//! ```json
//! { "version": 1, "tasks": [ { "id": "...", "text": "...", ... } ] }
//! ```
//!
//! Bare arrays written before the envelope existed are still accepted on load.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::PersistenceError;
use crate::task::Task;

/// Default key the task collection is stored under.
pub const STORAGE_KEY: &str = "@todos";

/// Newest envelope version this build reads and the one it writes.
pub const FORMAT_VERSION: u32 = 1;

/// Minimal string key-value storage.
pub trait KeyValueStore {
    /// Read the value under `key`, or `None` when nothing was stored yet.
    fn get_item(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()>;

    /// Copy the value under `key` to a timestamped location and return that
    /// location, or `None` when nothing was stored.
    fn quarantine_item(&mut self, key: &str, reason: &str) -> io::Result<Option<String>>;
}

/// Stores each key as a JSON file in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        f.write_all(value.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn quarantine_item(&mut self, key: &str, reason: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let backup_dir = self.dir.join("backup");
        fs::create_dir_all(&backup_dir)?;

        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("todos.json");
        let backup_path = backup_dir.join(format!("{}_{}_{}", timestamp, reason, file_name));
        fs::copy(&path, &backup_path)?;
        Ok(Some(backup_path.to_string_lossy().to_string()))
    }
}

/// Turn a storage key into a safe file stem: lowercase alphanumerics, other
/// characters become underscores, leading/trailing underscores dropped.
pub fn sanitize_key(key: &str) -> String {
    let mapped: String = key
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let mut out = String::with_capacity(mapped.len());
    let mut prev_underscore = false;
    for c in mapped.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push(c);
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "store".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    tasks: &'a [Task],
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    tasks: Vec<Task>,
}

/// Loads and saves the task collection under a single key.
pub struct TaskStore {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl TaskStore {
    pub fn new(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        TaskStore {
            store,
            key: key.into(),
        }
    }

    /// Read the stored collection; an absent key is an empty collection.
    pub fn load(&self) -> Result<Vec<Task>, PersistenceError> {
        let raw = self
            .store
            .get_item(&self.key)
            .map_err(|source| PersistenceError::Read {
                key: self.key.clone(),
                source,
            })?;
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let corrupt = |source| PersistenceError::Corrupt {
            key: self.key.clone(),
            source,
        };

        // An object is an envelope, anything else is read as a legacy array.
        if !raw.trim_start().starts_with('{') {
            let tasks: Vec<Task> = serde_json::from_str(&raw).map_err(corrupt)?;
            tracing::info!(key = %self.key, count = tasks.len(), "loaded unversioned task list");
            return Ok(tasks);
        }
        let header: Header = serde_json::from_str(&raw).map_err(corrupt)?;
        if header.version > FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                key: self.key.clone(),
                found: header.version,
                supported: FORMAT_VERSION,
            });
        }
        let envelope: Envelope = serde_json::from_str(&raw).map_err(corrupt)?;
        Ok(envelope.tasks)
    }

    /// Overwrite the stored collection with `tasks`.
    pub fn save(&mut self, tasks: &[Task]) -> Result<(), PersistenceError> {
        let envelope = EnvelopeRef {
            version: FORMAT_VERSION,
            tasks,
        };
        let data = serde_json::to_string_pretty(&envelope).map_err(|e| PersistenceError::Write {
            key: self.key.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        self.store
            .set_item(&self.key, &data)
            .map_err(|source| PersistenceError::Write {
                key: self.key.clone(),
                source,
            })?;
        tracing::debug!(key = %self.key, count = tasks.len(), "tasks saved");
        Ok(())
    }

    /// Save `db` if it has unsaved mutations. Returns whether a write happened.
    /// On failure the collection stays dirty and is written on the next flush.
    pub fn flush(&mut self, db: &mut Database) -> Result<bool, PersistenceError> {
        if !db.is_dirty() {
            return Ok(false);
        }
        match self.save(db.tasks()) {
            Ok(()) => {
                db.mark_clean();
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "save failed; in-memory changes kept");
                Err(e)
            }
        }
    }

    /// Load the collection once at start-up.
    ///
    /// When loading fails the stored payload is quarantined so a later save
    /// cannot overwrite it, and an empty collection is returned together with
    /// the error for the caller to report.
    pub fn open_database(&mut self) -> (Database, Option<PersistenceError>) {
        match self.load() {
            Ok(tasks) => {
                tracing::info!(key = %self.key, count = tasks.len(), "tasks loaded");
                (Database::from_tasks(tasks), None)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load tasks; starting empty");
                match self.store.quarantine_item(&self.key, "unreadable") {
                    Ok(Some(location)) => {
                        tracing::warn!(%location, "unreadable task data preserved")
                    }
                    Ok(None) => {}
                    Err(qe) => tracing::error!(error = %qe, "failed to preserve unreadable task data"),
                }
                (Database::default(), Some(e))
            }
        }
    }

    /// Make a timestamped copy of the stored collection.
    pub fn backup(&mut self) -> Result<Option<String>, PersistenceError> {
        self.store
            .quarantine_item(&self.key, "backup")
            .map_err(|source| PersistenceError::Backup {
                key: self.key.clone(),
                source,
            })
    }

    /// Raw access to the underlying store for auxiliary keys.
    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }
}
