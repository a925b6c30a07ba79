//! # Ethash Genesis
//!
//! The Ethash chain memoizes its genesis: it is built once, from the
//! overrides in force at that moment, and then serves as the chain identity
//! until `invalidate` (driven by a chain reopen).

use std::sync::Arc;

use shared_types::Hash;
use tracing::info;

use super::builder::{GenesisBlock, GenesisBuilder, GenesisError};
use super::cell::GenesisCell;
use super::overrides::GenesisRegistry;
use super::provider::GenesisProvider;
use super::sealer::{EthashSeal, SealEngine};

#[derive(Debug)]
pub struct EthashGenesis {
    engine: EthashSeal,
    registry: Arc<GenesisRegistry>,
    cell: GenesisCell<GenesisBlock>,
}

impl EthashGenesis {
    pub fn new(registry: Arc<GenesisRegistry>) -> Self {
        Self {
            engine: EthashSeal,
            registry,
            cell: GenesisCell::new(),
        }
    }

    pub fn registry(&self) -> &Arc<GenesisRegistry> {
        &self.registry
    }
}

impl GenesisProvider for EthashGenesis {
    fn sealer(&self) -> &dyn SealEngine {
        &self.engine
    }

    fn genesis(&self) -> Result<Arc<GenesisBlock>, GenesisError> {
        self.cell.get_or_try_init(|| {
            let overrides = self.registry.snapshot();
            let non_standard = overrides.is_non_standard();
            let genesis = GenesisBuilder::new(&self.engine, overrides).build()?;
            self.registry.mark_finalized();
            info!(
                hash = ?genesis.hash,
                state_root = ?genesis.state_root(),
                non_standard,
                "Ethash genesis computed"
            );
            Ok(genesis)
        })
    }

    fn known_genesis_state_root(&self) -> Option<Hash> {
        GenesisBuilder::new(&self.engine, self.registry.snapshot()).known_genesis_state_root()
    }

    fn invalidate(&self) {
        if self.cell.reset_with(|| self.registry.clear_finalized()) {
            info!("Ethash genesis invalidated");
        }
    }

    fn is_memoized(&self) -> bool {
        self.cell.is_computed()
    }
}
