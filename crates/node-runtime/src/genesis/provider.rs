//! # Genesis Providers
//!
//! A provider hands the chain its genesis. Engines without a dedicated chain
//! use [`GenericGenesis`], which rebuilds from the current overrides on every
//! call; Ethash memoizes (see [`super::ethash::EthashGenesis`]).

use std::sync::Arc;

use shared_types::{AccountMap, Hash};

use super::builder::{GenesisBlock, GenesisBuilder, GenesisError};
use super::overrides::GenesisRegistry;
use super::sealer::SealEngine;

pub trait GenesisProvider: Send + Sync {
    /// Engine whose seal fields and defaults this provider uses.
    fn sealer(&self) -> &dyn SealEngine;

    fn genesis(&self) -> Result<Arc<GenesisBlock>, GenesisError>;

    fn genesis_bytes(&self) -> Result<Vec<u8>, GenesisError> {
        Ok(self.genesis()?.bytes.clone())
    }

    fn genesis_state(&self) -> Result<AccountMap, GenesisError> {
        Ok(self.genesis()?.state.clone())
    }

    /// State root of the default allocation, `None` while a state override
    /// is configured.
    fn known_genesis_state_root(&self) -> Option<Hash>;

    /// Drop any memoized genesis so the next `genesis()` call rebuilds it
    /// from the current overrides.
    fn invalidate(&self);

    fn is_memoized(&self) -> bool;
}

/// Unmemoized provider: always consistent with the current overrides.
#[derive(Debug)]
pub struct GenericGenesis<E: SealEngine> {
    engine: E,
    registry: Arc<GenesisRegistry>,
}

impl<E: SealEngine> GenericGenesis<E> {
    pub fn new(engine: E, registry: Arc<GenesisRegistry>) -> Self {
        Self { engine, registry }
    }

    fn builder(&self) -> GenesisBuilder<'_> {
        GenesisBuilder::new(&self.engine, self.registry.snapshot())
    }
}

impl<E: SealEngine> GenesisProvider for GenericGenesis<E> {
    fn sealer(&self) -> &dyn SealEngine {
        &self.engine
    }

    fn genesis(&self) -> Result<Arc<GenesisBlock>, GenesisError> {
        self.builder().build().map(Arc::new)
    }

    fn known_genesis_state_root(&self) -> Option<Hash> {
        self.builder().known_genesis_state_root()
    }

    fn invalidate(&self) {}

    fn is_memoized(&self) -> bool {
        false
    }
}
