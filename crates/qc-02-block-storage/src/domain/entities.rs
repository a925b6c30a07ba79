//! # Domain Entities
//!
//! Records persisted by the chain store.

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Schema version written into `StorageMetadata`. Bump on any change to the
/// key layout or record encoding.
pub const DB_VERSION: u32 = 1;

/// A block stored on disk with integrity checksum.
///
/// `bytes` is the full RLP encoding of the block; `checksum` is CRC32 over
/// those bytes, computed at write time and verified on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlock {
    pub bytes: Vec<u8>,
    pub checksum: u32,
}

impl StoredBlock {
    pub fn new(bytes: Vec<u8>, checksum: u32) -> Self {
        Self { bytes, checksum }
    }
}

/// Global storage metadata.
///
/// Written once, together with the genesis block, and never updated
/// afterwards. Its presence is what makes a store "initialized".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMetadata {
    /// Storage format version for migrations.
    pub version: u32,
    /// Hash of the genesis block this store is bound to.
    pub genesis_hash: Hash,
    /// State root committed by the genesis header.
    pub state_root: Hash,
    /// Number of accounts written from the genesis allocation.
    pub account_count: u64,
}

impl StorageMetadata {
    /// Create metadata for a store bound to `genesis_hash`.
    pub fn with_genesis(genesis_hash: Hash, state_root: Hash, account_count: u64) -> Self {
        Self {
            version: DB_VERSION,
            genesis_hash,
            state_root,
            account_count,
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.version == DB_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_with_genesis_uses_current_version() {
        let meta = StorageMetadata::with_genesis(Hash::repeat_byte(1), Hash::repeat_byte(2), 12);
        assert_eq!(meta.version, DB_VERSION);
        assert!(meta.is_compatible());
        assert_eq!(meta.account_count, 12);
    }

    #[test]
    fn test_metadata_survives_bincode() {
        let meta = StorageMetadata::with_genesis(Hash::repeat_byte(7), Hash::zero(), 0);
        let bytes = bincode::serialize(&meta).unwrap();
        let back: StorageMetadata = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_old_version_is_incompatible() {
        let mut meta = StorageMetadata::with_genesis(Hash::zero(), Hash::zero(), 0);
        meta.version = DB_VERSION + 1;
        assert!(!meta.is_compatible());
    }
}
