//! todo-garden: a two-list task tracker.
//!
//! Tasks are planted in a pending list, moved to a completed list when done,
//! and can be replanted or deleted from either list. The whole state is kept
//! as one JSON document in a key-value store and rewritten after every change.

pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
pub mod summary;
pub mod task;
pub mod task_board;
pub mod ui;

pub use error::{GardenError, Result};
pub use storage::{FileStore, KeyValueStore, MemoryStore, TaskData, STORAGE_KEY};
pub use task::Task;
pub use task_board::{TaskBoard, TaskList};
