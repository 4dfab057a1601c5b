// Taskboard - local kanban board with per-column task ordering

pub mod board;
pub mod codec;
pub mod columns;
pub mod config;
pub mod filter;
pub mod models;
pub mod persist;
pub mod storage;

// Re-export main types for convenience
pub use board::Board;
pub use columns::{Column, column_id, group_tasks_by_column};
pub use filter::TagHighlight;
pub use models::{DEFAULT_COLUMNS, DONE_COLUMN, Priority, Task, TaskDraft, TaskPatch};
pub use persist::{MemoryStorage, Persistence};
pub use storage::SqliteStorage;
