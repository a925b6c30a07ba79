//! # Canonical Chain
//!
//! `CanonChain` pairs a genesis provider with an open `ChainDatabase`. The
//! store is opened with the provider's genesis bytes and initial state, so
//! it is bound to that genesis identity for as long as the chain is open.
//!
//! ## Reopen Sequence
//!
//! 1. Close the store (releases the directory lock)
//! 2. Invalidate the memoized genesis
//! 3. Rebuild the genesis from the current overrides
//! 4. Open the store again under the requested `WithExisting` policy

use std::path::{Path, PathBuf};
use std::sync::Arc;

use qc_02_block_storage::{ChainDatabase, ProgressCallback, StorageError, WithExisting};
use shared_types::Hash;
use thiserror::Error;
use tracing::{info, warn};

use crate::genesis::{GenesisBlock, GenesisError, GenesisProvider};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Genesis construction failed: {0}")]
    Genesis(#[from] GenesisError),

    #[error("Chain store error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CanonChain {
    provider: Arc<dyn GenesisProvider>,
    path: Option<PathBuf>,
    genesis: Arc<GenesisBlock>,
    store: ChainDatabase,
}

impl std::fmt::Debug for CanonChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonChain")
            .field("sealer", &self.provider.sealer().name())
            .field("path", &self.path)
            .field("genesis", &self.genesis.hash)
            .field("store", &self.store)
            .finish()
    }
}

impl CanonChain {
    /// Open the chain at `path` (`None` keeps it in memory).
    ///
    /// # Errors
    ///
    /// - `Genesis` if the genesis cannot be built from the current overrides
    /// - `Storage` if the store cannot be opened or is bound to another
    ///   genesis under `WithExisting::Verify`
    pub fn open(
        provider: Arc<dyn GenesisProvider>,
        path: Option<&Path>,
        existing: WithExisting,
        progress: Option<&ProgressCallback>,
    ) -> Result<Self, BootstrapError> {
        let genesis = provider.genesis()?;
        info!(
            sealer = provider.sealer().name(),
            genesis = ?genesis.hash,
            policy = %existing,
            "Opening chain"
        );

        let store = ChainDatabase::open(&genesis.bytes, &genesis.state, path, existing, progress)?;
        if store.genesis_hash() != genesis.hash {
            warn!(
                configured = ?genesis.hash,
                recorded = ?store.genesis_hash(),
                "Chain store is bound to a different genesis"
            );
        }

        Ok(Self {
            provider,
            path: path.map(Path::to_path_buf),
            genesis,
            store,
        })
    }

    /// Close the store, rebuild the genesis from the current overrides and
    /// open the store again.
    pub fn reopen(
        self,
        existing: WithExisting,
        progress: Option<&ProgressCallback>,
    ) -> Result<Self, BootstrapError> {
        let CanonChain {
            provider,
            path,
            store,
            ..
        } = self;

        store.close();
        provider.invalidate();
        info!("Reopening chain");
        Self::open(provider, path.as_deref(), existing, progress)
    }

    /// Genesis this chain was opened with.
    pub fn genesis(&self) -> &Arc<GenesisBlock> {
        &self.genesis
    }

    pub fn genesis_hash(&self) -> Hash {
        self.genesis.hash
    }

    pub fn store(&self) -> &ChainDatabase {
        &self.store
    }

    /// False when a `Trust` open kept a store bound to another genesis.
    pub fn is_bound_to_genesis(&self) -> bool {
        self.store.genesis_hash() == self.genesis.hash
    }

    pub fn provider(&self) -> &Arc<dyn GenesisProvider> {
        &self.provider
    }

    pub fn close(self) {
        self.store.close();
    }
}
