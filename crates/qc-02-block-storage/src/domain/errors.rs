//! # Domain Errors
//!
//! Error types for the chain store.
//!
//! - Each error maps to a specific way an open can fail
//! - No panics in domain logic (use Result instead)

use shared_types::Hash;
use std::fmt;

/// Errors that can occur while opening or reading a chain store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store is bound to a different genesis than the one configured.
    GenesisMismatch { configured: Hash, recorded: Hash },

    /// No metadata found where an existing store was expected.
    NotInitialized,

    /// Store was written by an incompatible schema version.
    IncompatibleVersion { found: u32, expected: u32 },

    /// Checksum mismatch on a stored block.
    DataCorruption {
        block_hash: Hash,
        expected_checksum: u32,
        actual_checksum: u32,
    },

    /// Stored genesis data is internally inconsistent.
    CorruptGenesis { reason: String },

    /// Genesis bytes handed to the store are not a block.
    InvalidGenesis { reason: String },

    /// Database I/O error.
    DatabaseError { message: String },

    /// Serialization/deserialization error.
    SerializationError { message: String },

    /// Database lock could not be acquired (process already running).
    DatabaseLocked { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::GenesisMismatch {
                configured,
                recorded,
            } => {
                write!(
                    f,
                    "Genesis mismatch: configured {:?}, store holds {:?}",
                    configured, recorded
                )
            }
            StorageError::NotInitialized => write!(f, "Chain store is not initialized"),
            StorageError::IncompatibleVersion { found, expected } => {
                write!(
                    f,
                    "Incompatible store version {} (expected {})",
                    found, expected
                )
            }
            StorageError::DataCorruption {
                block_hash,
                expected_checksum,
                actual_checksum,
            } => {
                write!(
                    f,
                    "Data corruption detected for block {:?}: expected checksum {}, got {}",
                    block_hash, expected_checksum, actual_checksum
                )
            }
            StorageError::CorruptGenesis { reason } => {
                write!(f, "Stored genesis is corrupt: {}", reason)
            }
            StorageError::InvalidGenesis { reason } => {
                write!(f, "Invalid genesis block: {}", reason)
            }
            StorageError::DatabaseError { message } => {
                write!(f, "Database error: {}", message)
            }
            StorageError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
            StorageError::DatabaseLocked { message } => {
                write!(f, "Database locked: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Key-value store errors.
#[derive(Debug, Clone)]
pub enum KVStoreError {
    /// I/O error during read/write.
    IOError { message: String },
    /// Data corruption in the store.
    CorruptionError { message: String },
    /// Key not found.
    NotFound,
}

impl fmt::Display for KVStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KVStoreError::IOError { message } => write!(f, "KV store I/O error: {}", message),
            KVStoreError::CorruptionError { message } => {
                write!(f, "KV store corruption: {}", message)
            }
            KVStoreError::NotFound => write!(f, "Key not found in KV store"),
        }
    }
}

impl std::error::Error for KVStoreError {}

impl From<KVStoreError> for StorageError {
    fn from(err: KVStoreError) -> Self {
        StorageError::DatabaseError {
            message: err.to_string(),
        }
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::SerializationError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display_names_both_hashes() {
        let err = StorageError::GenesisMismatch {
            configured: Hash::repeat_byte(0xAB),
            recorded: Hash::repeat_byte(0xCD),
        };
        let msg = err.to_string();
        assert!(msg.contains("Genesis mismatch"));
        assert!(msg.contains("abab"));
        assert!(msg.contains("cdcd"));
    }

    #[test]
    fn test_kv_error_conversion() {
        let kv_err = KVStoreError::IOError {
            message: "disk failure".to_string(),
        };
        let storage_err: StorageError = kv_err.into();

        match storage_err {
            StorageError::DatabaseError { message } => {
                assert!(message.contains("disk failure"));
            }
            _ => panic!("Expected DatabaseError"),
        }
    }
}
