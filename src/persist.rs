// Persistence contract between the board and durable storage

use crate::models::Task;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Well-known slot the board is saved under
pub const STORAGE_KEY: &str = "kanban-board";

/// Format version written alongside the tasks
pub const STORAGE_VERSION: &str = "1.0";

/// Durable home for the board's task list
///
/// The board calls `persist` with the full list after every mutation that
/// changed something, `load_initial` once when it is opened, and
/// `clear_persisted` on reset.
pub trait Persistence {
    /// Store the full task list, replacing whatever was there
    fn persist(&mut self, tasks: &[Task]) -> Result<()>;

    /// Previously persisted tasks; empty when nothing usable is stored
    fn load_initial(&mut self) -> Vec<Task>;

    /// Remove the stored slot entirely
    fn clear_persisted(&mut self) -> Result<()>;
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: &'a str,
    tasks: &'a [Task],
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    version: String,
    #[serde(default)]
    tasks: Vec<Task>,
}

/// Serialize tasks into the versioned storage envelope
pub fn encode_stored(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(&EnvelopeRef {
        version: STORAGE_VERSION,
        tasks,
    })
    .context("Failed to serialize stored board")
}

/// Read tasks back out of a storage envelope
pub fn decode_stored(raw: &str) -> Result<Vec<Task>> {
    let envelope: Envelope = serde_json::from_str(raw).context("Failed to parse stored board")?;
    if envelope.version != STORAGE_VERSION {
        // No migrations exist yet; missing fields are defaulted by serde
        debug!(version = %envelope.version, "Stored board has a different format version");
    }
    Ok(envelope.tasks)
}

/// In-process storage slot
///
/// Keeps the encoded envelope exactly as a durable backend would, so
/// unreadable data and version handling behave the same.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    slot: Option<String>,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw slot contents, as if written by an earlier session
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
            saves: 0,
        }
    }

    /// Raw slot contents, if any
    pub fn raw(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Number of times `persist` has been called
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Persistence for MemoryStorage {
    fn persist(&mut self, tasks: &[Task]) -> Result<()> {
        self.slot = Some(encode_stored(tasks)?);
        self.saves += 1;
        Ok(())
    }

    fn load_initial(&mut self) -> Vec<Task> {
        let Some(raw) = self.slot.as_deref() else {
            return Vec::new();
        };
        decode_stored(raw).unwrap_or_else(|e| {
            warn!(error = %e, "Stored board is unreadable, starting empty");
            Vec::new()
        })
    }

    fn clear_persisted(&mut self) -> Result<()> {
        self.slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use serde_json::{Map, Value};

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: "Stored".to_string(),
            description: String::new(),
            status: "In Progress".to_string(),
            order: 2,
            priority: Priority::Low,
            due_date: String::new(),
            tags: vec![],
            extra: Map::new(),
        }
    }

    #[test]
    fn test_encode_stored_envelope() {
        let raw = encode_stored(&[task("t1")]).unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["version"], STORAGE_VERSION);
        assert_eq!(parsed["tasks"][0]["id"], "t1");
    }

    #[test]
    fn test_decode_stored_missing_tasks() {
        let tasks = decode_stored(r#"{"version":"1.0"}"#).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_decode_stored_garbage() {
        assert!(decode_stored("{{{").is_err());
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load_initial().is_empty());

        storage.persist(&[task("t1")]).unwrap();
        storage.persist(&[task("t1")]).unwrap();
        assert_eq!(storage.saves(), 2);

        let loaded = storage.load_initial();
        assert_eq!(loaded, vec![task("t1")]);
    }

    #[test]
    fn test_memory_storage_unreadable_slot() {
        let mut storage = MemoryStorage::with_raw("not json");
        assert!(storage.load_initial().is_empty());
    }

    #[test]
    fn test_memory_storage_clear() {
        let mut storage = MemoryStorage::new();
        storage.persist(&[task("t1")]).unwrap();
        storage.clear_persisted().unwrap();
        assert!(storage.raw().is_none());
        assert!(storage.load_initial().is_empty());
    }
}
