//! # Adapters Module
//!
//! - `storage`: `KeyValueStore` implementations (in-memory, file-backed)
//! - `lock`: Database process locking (singleton guard)

pub mod lock;
pub mod storage;

pub use lock::{DatabaseLock, LockError};
pub use storage::{FileBackedKVStore, InMemoryKVStore};
