// Durable board storage: a SQLite key/value slot table

use crate::models::Task;
use crate::persist::{Persistence, STORAGE_KEY, decode_stored, encode_stored};
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CURRENT_VERSION: u32 = 1;

/// Board storage in `<path>/.taskboard/taskboard.db`
///
/// Holds an exclusive lock on `.taskboard/taskboard.lock` while open, so
/// only one process writes a board at a time.
pub struct SqliteStorage {
    base_path: PathBuf,
    db: Connection,
    _lock: File,
}

impl SqliteStorage {
    /// Open or create board storage under the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().join(".taskboard");

        fs::create_dir_all(&base_path).context("Failed to create storage directory")?;

        let lock = File::create(base_path.join("taskboard.lock")).context("Failed to create lock file")?;
        lock.try_lock_exclusive()
            .map_err(|_| eyre!("Board at {:?} is already open in another process", base_path))?;

        let db_path = base_path.join("taskboard.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let storage = Self {
            base_path,
            db,
            _lock: lock,
        };

        storage.create_schema()?;
        storage.create_gitignore()?;
        storage.write_version()?;

        info!(path = ?storage.base_path, "Opened board storage");
        Ok(storage)
    }

    /// Get the storage directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    fn create_gitignore(&self) -> Result<()> {
        let gitignore_path = self.base_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "taskboard.db\ntaskboard.db-shm\ntaskboard.db-wal\ntaskboard.lock\n")?;
        }
        Ok(())
    }

    fn write_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
        }
        Ok(())
    }

    /// Raw contents of a slot
    pub fn read_slot(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Replace the contents of a slot
    pub fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        self.db.execute(
            "INSERT OR REPLACE INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now_ms()],
        )?;
        Ok(())
    }

    /// Remove a slot; missing slots are fine
    pub fn delete_slot(&self, key: &str) -> Result<()> {
        self.db.execute("DELETE FROM slots WHERE key = ?1", [key])?;
        Ok(())
    }
}

impl Persistence for SqliteStorage {
    fn persist(&mut self, tasks: &[Task]) -> Result<()> {
        let raw = encode_stored(tasks)?;
        self.write_slot(STORAGE_KEY, &raw).context("Failed to save board")?;
        debug!(count = tasks.len(), "Saved board");
        Ok(())
    }

    fn load_initial(&mut self) -> Vec<Task> {
        let raw = match self.read_slot(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored board, starting empty");
                return Vec::new();
            }
        };

        match decode_stored(&raw) {
            Ok(tasks) => {
                info!(count = tasks.len(), "Loaded stored board");
                tasks
            }
            Err(e) => {
                warn!(error = %e, "Stored board is unreadable, starting empty");
                Vec::new()
            }
        }
    }

    fn clear_persisted(&mut self) -> Result<()> {
        self.delete_slot(STORAGE_KEY).context("Failed to clear stored board")
    }
}

/// Current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
