//! # Chain Database
//!
//! Opens a chain store and reconciles it with the configured genesis.
//!
//! ## Open Sequence
//!
//! 1. Derive the genesis identity from the encoded genesis block
//! 2. Lock the data directory (persistent stores only)
//! 3. Wipe stored data if the policy is `Kill`
//! 4. Empty store: write genesis block, allocation and metadata in one batch
//! 5. Initialized store: check schema version, then compare genesis hashes
//!    and apply the `WithExisting` policy

use crate::adapters::lock::DatabaseLock;
use crate::adapters::storage::{FileBackedKVStore, InMemoryKVStore};
use crate::domain::entities::{StorageMetadata, StoredBlock, DB_VERSION};
use crate::domain::errors::StorageError;
use crate::domain::identity::{genesis_identity, header_state_root};
use crate::domain::value_objects::{KeyPrefix, ProgressCallback, WithExisting};
use crate::ports::outbound::{BatchOperation, ChecksumProvider, DefaultChecksumProvider, KeyValueStore};
use shared_types::{AccountMap, AccountState, Address, Hash};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the key-value store inside a data directory.
pub const STORE_FILE: &str = "chain.db";

/// An open chain store bound to a single genesis.
pub struct ChainDatabase {
    kv: Box<dyn KeyValueStore>,
    checksum: DefaultChecksumProvider,
    path: Option<PathBuf>,
    metadata: StorageMetadata,
    /// Held for the lifetime of the database; `None` for in-memory stores.
    lock: Option<DatabaseLock>,
}

impl std::fmt::Debug for ChainDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainDatabase")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("locked", &self.lock.is_some())
            .finish()
    }
}

impl ChainDatabase {
    /// Open (or create) the store at `path` for the chain whose genesis is
    /// `genesis_block`.
    ///
    /// `path == None` opens a fresh in-memory store. `progress` is called
    /// while accounts are written on first initialization and while they
    /// are re-read under `WithExisting::Verify`.
    ///
    /// # Errors
    ///
    /// - `InvalidGenesis` if `genesis_block` is not an encoded block
    /// - `DatabaseLocked` if another handle owns the data directory
    /// - `IncompatibleVersion` if the store uses another schema
    /// - `GenesisMismatch` under `Verify` when the store holds another chain
    /// - `DataCorruption` / `CorruptGenesis` if verification fails
    pub fn open(
        genesis_block: &[u8],
        genesis_state: &AccountMap,
        path: Option<&Path>,
        existing: WithExisting,
        progress: Option<&ProgressCallback>,
    ) -> Result<Self, StorageError> {
        let genesis_hash = genesis_identity(genesis_block)?;
        let mut db = Self::open_backend(path, existing)?;

        // Kill wiped the backend in open_backend; there is nothing to reconcile.
        let recorded = match existing {
            WithExisting::Kill => None,
            WithExisting::Trust | WithExisting::Verify => db.read_metadata()?,
        };

        match recorded {
            None => {
                info!(
                    "[qc-02] 🌱 Initializing chain store with genesis {:?}",
                    genesis_hash
                );
                db.initialize(genesis_block, genesis_hash, genesis_state, progress)?;
            }
            Some(metadata) => {
                Self::check_version(&metadata)?;
                db.metadata = metadata;

                if db.metadata.genesis_hash != genesis_hash {
                    if existing == WithExisting::Verify {
                        return Err(StorageError::GenesisMismatch {
                            configured: genesis_hash,
                            recorded: db.metadata.genesis_hash,
                        });
                    }
                    warn!(
                        configured = ?genesis_hash,
                        recorded = ?db.metadata.genesis_hash,
                        "[qc-02] ⚠️ Stored chain has a different genesis; keeping stored data"
                    );
                } else {
                    info!("[qc-02] ✅ Reusing chain store (genesis {:?})", genesis_hash);
                }

                if existing == WithExisting::Verify {
                    db.verify_stored(progress)?;
                }
            }
        }

        Ok(db)
    }

    /// Open an already-initialized store without a configured genesis.
    ///
    /// # Errors
    ///
    /// `NotInitialized` if the store holds no chain, which is always the case
    /// for in-memory stores and under `WithExisting::Kill`.
    pub fn open_database(
        path: Option<&Path>,
        existing: WithExisting,
        progress: Option<&ProgressCallback>,
    ) -> Result<Self, StorageError> {
        let mut db = Self::open_backend(path, existing)?;

        let metadata = db.read_metadata()?.ok_or(StorageError::NotInitialized)?;
        Self::check_version(&metadata)?;
        db.metadata = metadata;

        if existing == WithExisting::Verify {
            db.verify_stored(progress)?;
        }
        Ok(db)
    }

    /// Release the store and its directory lock.
    pub fn close(self) {
        debug!("[qc-02] Closing chain store {:?}", self.path);
    }

    fn open_backend(path: Option<&Path>, existing: WithExisting) -> Result<Self, StorageError> {
        let (mut kv, lock): (Box<dyn KeyValueStore>, Option<DatabaseLock>) = match path {
            Some(dir) => {
                let lock = DatabaseLock::acquire(dir)?;
                let store = FileBackedKVStore::open(dir.join(STORE_FILE))?;
                (Box::new(store), Some(lock))
            }
            None => (Box::new(InMemoryKVStore::new()), None),
        };

        if existing == WithExisting::Kill {
            warn!("[qc-02] 🗑️ Discarding stored chain data ({:?})", path);
            kv.clear()?;
        }

        Ok(Self {
            kv,
            checksum: DefaultChecksumProvider,
            path: path.map(Path::to_path_buf),
            metadata: StorageMetadata::with_genesis(Hash::zero(), Hash::zero(), 0),
            lock,
        })
    }

    fn check_version(metadata: &StorageMetadata) -> Result<(), StorageError> {
        if !metadata.is_compatible() {
            return Err(StorageError::IncompatibleVersion {
                found: metadata.version,
                expected: DB_VERSION,
            });
        }
        Ok(())
    }

    fn read_metadata(&self) -> Result<Option<StorageMetadata>, StorageError> {
        match self.kv.get(&KeyPrefix::metadata_key())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Write the genesis block, its allocation and the metadata record as a
    /// single batch.
    fn initialize(
        &mut self,
        genesis_block: &[u8],
        genesis_hash: Hash,
        genesis_state: &AccountMap,
        progress: Option<&ProgressCallback>,
    ) -> Result<(), StorageError> {
        let state_root = header_state_root(genesis_block)?;
        let total = genesis_state.len() as u64;
        let mut batch = Vec::with_capacity(genesis_state.len() + 3);

        let stored = StoredBlock::new(
            genesis_block.to_vec(),
            self.checksum.compute_crc32(genesis_block),
        );
        batch.push(BatchOperation::put(
            KeyPrefix::block_key(&genesis_hash),
            bincode::serialize(&stored)?,
        ));
        batch.push(BatchOperation::put(
            KeyPrefix::height_key(0),
            genesis_hash.as_bytes(),
        ));

        report(progress, 0, total);
        for (written, (address, account)) in genesis_state.iter().enumerate() {
            batch.push(BatchOperation::put(
                KeyPrefix::account_key(address),
                bincode::serialize(account)?,
            ));
            report(progress, written as u64 + 1, total);
        }

        let metadata = StorageMetadata::with_genesis(genesis_hash, state_root, total);
        batch.push(BatchOperation::put(
            KeyPrefix::metadata_key(),
            bincode::serialize(&metadata)?,
        ));

        self.kv.atomic_batch_write(batch)?;
        self.metadata = metadata;

        info!(
            accounts = total,
            state_root = ?state_root,
            "[qc-02] 💾 Genesis written"
        );
        Ok(())
    }

    /// Re-check the stored genesis against the metadata record: block
    /// checksum, block identity, header state root, account count and
    /// account state root.
    fn verify_stored(&self, progress: Option<&ProgressCallback>) -> Result<(), StorageError> {
        let corrupt = |reason: String| StorageError::CorruptGenesis { reason };

        let block = self.genesis_block_bytes()?;
        let identity = genesis_identity(&block)?;
        if identity != self.metadata.genesis_hash {
            return Err(corrupt(format!(
                "stored block hashes to {:?}, metadata records {:?}",
                identity, self.metadata.genesis_hash
            )));
        }

        let header_root = header_state_root(&block)?;
        if header_root != self.metadata.state_root {
            return Err(corrupt(format!(
                "header state root {:?} differs from recorded {:?}",
                header_root, self.metadata.state_root
            )));
        }

        let accounts = self.load_accounts(progress)?;
        if accounts.len() as u64 != self.metadata.account_count {
            return Err(corrupt(format!(
                "{} accounts stored, metadata records {}",
                accounts.len(),
                self.metadata.account_count
            )));
        }

        let root = qc_04_state_management::state_root(&accounts);
        if root != self.metadata.state_root {
            return Err(corrupt(format!(
                "stored accounts commit to {:?}, expected {:?}",
                root, self.metadata.state_root
            )));
        }

        info!("[qc-02] 🔍 Verified stored genesis {:?}", identity);
        Ok(())
    }

    fn load_accounts(&self, progress: Option<&ProgressCallback>) -> Result<AccountMap, StorageError> {
        let prefix = KeyPrefix::Account.as_bytes();
        let entries = self.kv.prefix_scan(prefix)?;
        let total = entries.len() as u64;

        let mut accounts = AccountMap::new();
        report(progress, 0, total);
        for (read, (key, value)) in entries.into_iter().enumerate() {
            let raw = &key[prefix.len()..];
            if raw.len() != Address::len_bytes() {
                return Err(StorageError::CorruptGenesis {
                    reason: format!("account key of {} bytes", raw.len()),
                });
            }
            let account: AccountState = bincode::deserialize(&value)?;
            accounts.insert(Address::from_slice(raw), account);
            report(progress, read as u64 + 1, total);
        }
        Ok(accounts)
    }

    /// Genesis hash this store is bound to.
    pub fn genesis_hash(&self) -> Hash {
        self.metadata.genesis_hash
    }

    /// State root committed by the stored genesis header.
    pub fn state_root(&self) -> Hash {
        self.metadata.state_root
    }

    pub fn metadata(&self) -> &StorageMetadata {
        &self.metadata
    }

    /// Data directory, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Encoded genesis block, checksum-verified.
    pub fn genesis_block_bytes(&self) -> Result<Vec<u8>, StorageError> {
        let hash = self.metadata.genesis_hash;
        let bytes = self
            .kv
            .get(&KeyPrefix::block_key(&hash))?
            .ok_or_else(|| StorageError::CorruptGenesis {
                reason: format!("genesis block {:?} missing", hash),
            })?;
        let stored: StoredBlock = bincode::deserialize(&bytes)?;

        let actual = self.checksum.compute_crc32(&stored.bytes);
        if actual != stored.checksum {
            return Err(StorageError::DataCorruption {
                block_hash: hash,
                expected_checksum: stored.checksum,
                actual_checksum: actual,
            });
        }
        Ok(stored.bytes)
    }

    /// Hash of the canonical block at `height`.
    pub fn block_hash_at(&self, height: u64) -> Result<Option<Hash>, StorageError> {
        match self.kv.get(&KeyPrefix::height_key(height))? {
            Some(bytes) if bytes.len() == 32 => Ok(Some(Hash::from_slice(&bytes))),
            Some(bytes) => Err(StorageError::CorruptGenesis {
                reason: format!("height index entry of {} bytes", bytes.len()),
            }),
            None => Ok(None),
        }
    }

    pub fn account(&self, address: &Address) -> Result<Option<AccountState>, StorageError> {
        match self.kv.get(&KeyPrefix::account_key(address))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every account written from the genesis allocation.
    pub fn accounts(&self) -> Result<AccountMap, StorageError> {
        self.load_accounts(None)
    }
}

fn report(progress: Option<&ProgressCallback>, done: u64, total: u64) {
    if let Some(callback) = progress {
        callback(done, total);
    }
}
