//! # Block Storage Engine (qc-02)
//!
//! Persistent chain store for Quantum-Chain. A store is bound to exactly one
//! genesis identity (the Keccak256 of the genesis header) the first time it
//! is initialized; every later open is reconciled against that binding.
//!
//! ## Open Flow
//!
//! ```text
//! genesis bytes ──genesis_identity──→ genesis hash
//!                                          │
//!   path ──[lock]──[Kill? wipe]──→ KeyValueStore
//!                                          │
//!                       ┌──────────────────┼──────────────────┐
//!                       ↓                  ↓                  ↓
//!                 empty store        same genesis      different genesis
//!                       │                  │                  │
//!               write genesis,      reuse (Verify:     Verify: GenesisMismatch
//!               state, metadata     re-check block     Trust:  warn, keep
//!                                   and state root)            recorded binding
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Single Genesis | A store records one genesis hash, written once |
//! | 2 | Data Integrity | Stored genesis block carries a CRC32 checksum |
//! | 3 | Atomic Writes | Initialization is a single batch |
//! | 4 | Exclusive Access | One process per data directory (flock) |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities, value objects, errors, genesis identity
//! - `ports/` - Outbound SPI (key-value store, checksum)
//! - `adapters/` - In-memory and file-backed stores, process lock
//! - `service.rs` - `ChainDatabase`, the open/reopen entry points
//!
//! ## Usage
//!
//! ```ignore
//! use qc_02_block_storage::{ChainDatabase, WithExisting};
//!
//! let db = ChainDatabase::open(&genesis_bytes, &state, Some(path), WithExisting::Verify, None)?;
//! assert_eq!(db.genesis_hash(), expected_hash);
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use adapters::lock::{DatabaseLock, LockError};
pub use adapters::storage::{FileBackedKVStore, InMemoryKVStore};
pub use domain::entities::{StorageMetadata, StoredBlock, DB_VERSION};
pub use domain::errors::{KVStoreError, StorageError};
pub use domain::identity::genesis_identity;
pub use domain::value_objects::{KeyPrefix, ProgressCallback, WithExisting};
pub use ports::outbound::{BatchOperation, ChecksumProvider, DefaultChecksumProvider, KeyValueStore};
pub use service::ChainDatabase;
