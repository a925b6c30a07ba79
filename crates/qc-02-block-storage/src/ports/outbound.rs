//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by `ChainDatabase`.

use crate::domain::errors::KVStoreError;

/// Key/value pairs returned by a prefix scan.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value database operations.
///
/// Production: `FileBackedKVStore`
/// Testing and ephemeral chains: `InMemoryKVStore`
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// All pairs whose key starts with `prefix`, in key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;

    /// Remove every key.
    fn clear(&mut self) -> Result<(), KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Abstract interface for checksum computation.
pub trait ChecksumProvider: Send + Sync {
    /// Compute CRC32 checksum of data.
    fn compute_crc32(&self, data: &[u8]) -> u32;

    /// Verify CRC32 checksum matches.
    fn verify_crc32(&self, data: &[u8], expected: u32) -> bool {
        self.compute_crc32(data) == expected
    }
}

/// Default checksum provider using crc32fast.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultChecksumProvider;

impl ChecksumProvider for DefaultChecksumProvider {
    fn compute_crc32(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}
