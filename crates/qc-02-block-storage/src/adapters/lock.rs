//! # Database Process Locking
//!
//! Prevents two processes from opening the same data directory. Without it,
//! a concurrent `Kill` could wipe a store another node is still writing.
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::errors::StorageError;

/// Errors from database locking
#[derive(Debug)]
pub enum LockError {
    /// Lock file could not be created
    CreateFailed(io::Error),
    /// Database is already locked by another process
    AlreadyLocked { pid: Option<u32>, path: PathBuf },
    /// Failed to write PID to lock file
    WriteFailed(io::Error),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::CreateFailed(e) => write!(f, "Failed to create lock file: {}", e),
            LockError::AlreadyLocked { pid, path } => {
                if let Some(p) = pid {
                    write!(f, "Database already in use by process {} ({})", p, path.display())
                } else {
                    write!(f, "Database already in use ({})", path.display())
                }
            }
            LockError::WriteFailed(e) => write!(f, "Failed to write PID to lock file: {}", e),
        }
    }
}

impl std::error::Error for LockError {}

impl From<LockError> for StorageError {
    fn from(err: LockError) -> Self {
        StorageError::DatabaseLocked {
            message: err.to_string(),
        }
    }
}

/// Exclusive lock on a data directory, released on drop.
pub struct DatabaseLock {
    /// Kept open to hold the lock
    file: File,
    path: PathBuf,
    pid: u32,
}

impl std::fmt::Debug for DatabaseLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseLock")
            .field("path", &self.path)
            .field("pid", &self.pid)
            .finish()
    }
}

impl DatabaseLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Acquire an exclusive lock on `data_dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns `LockError::AlreadyLocked` if another handle holds the lock.
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        std::fs::create_dir_all(data_dir).map_err(LockError::CreateFailed)?;
        let lock_path = data_dir.join(Self::LOCK_FILE);

        // Not truncated on open: the holder's PID must stay readable.
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(LockError::CreateFailed)?;

        if file.try_lock_exclusive().is_err() {
            return Err(LockError::AlreadyLocked {
                pid: Self::read_existing_pid(&lock_path),
                path: lock_path,
            });
        }

        let pid = std::process::id();
        file.set_len(0).map_err(LockError::WriteFailed)?;
        writeln!(file, "{}", pid).map_err(LockError::WriteFailed)?;
        file.sync_all().map_err(LockError::WriteFailed)?;

        tracing::debug!("[qc-02] 🔒 Locked {}", lock_path.display());

        Ok(Self {
            file,
            path: lock_path,
            pid,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for DatabaseLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lock_acquire_creates_file() {
        let dir = TempDir::new().unwrap();

        let lock = DatabaseLock::acquire(dir.path()).expect("Should acquire lock");
        assert!(lock.path().exists());
        assert_eq!(lock.pid(), std::process::id());
    }

    #[test]
    fn test_lock_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let lock = DatabaseLock::acquire(&nested).expect("Should acquire lock");
        assert!(nested.is_dir());
        drop(lock);
    }

    #[test]
    fn test_lock_contains_pid() {
        let dir = TempDir::new().unwrap();

        let lock = DatabaseLock::acquire(dir.path()).expect("Should acquire lock");
        let content = fs::read_to_string(lock.path()).unwrap();
        let stored_pid: u32 = content.trim().parse().unwrap();
        assert_eq!(stored_pid, std::process::id());
    }

    #[test]
    fn test_double_lock_fails_and_reports_holder() {
        let dir = TempDir::new().unwrap();

        let _lock = DatabaseLock::acquire(dir.path()).expect("First lock should succeed");

        match DatabaseLock::acquire(dir.path()) {
            Err(LockError::AlreadyLocked { pid, .. }) => {
                assert_eq!(pid, Some(std::process::id()));
            }
            other => panic!("Expected AlreadyLocked, got {:?}", other),
        }
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = TempDir::new().unwrap();

        {
            let _lock = DatabaseLock::acquire(dir.path()).expect("Should acquire");
        }

        let _again = DatabaseLock::acquire(dir.path()).expect("Should acquire after release");
    }
}
