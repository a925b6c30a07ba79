//! # Quantum-Chain Node Runtime
//!
//! Opens the canonical chain for the configured engine.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Apply genesis overrides to the registry
//! 3. Build the genesis for the configured sealer
//! 4. Open the chain store and reconcile it with the genesis

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use node_runtime::{CanonChain, GenesisRegistry, NodeConfig};
use qc_02_block_storage::ProgressCallback;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Quantum-Chain Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    info!("Sealer: {}", config.genesis.sealer);
    info!("Data Dir: {:?}", config.storage.data_dir);

    let registry = Arc::new(GenesisRegistry::new());
    config
        .genesis
        .apply_to(&registry)
        .context("Failed to apply genesis overrides")?;
    if registry.is_non_standard() {
        warn!("Running with a non-standard genesis");
    }

    let provider = config.genesis.sealer.genesis_provider(Arc::clone(&registry));
    let progress: ProgressCallback = Arc::new(|done, total| {
        debug!("[qc-02] Writing genesis state {}/{}", done, total);
    });

    let chain = CanonChain::open(
        provider,
        config.storage.data_dir.as_deref(),
        config.storage.existing,
        Some(&progress),
    )
    .context("Failed to open chain")?;

    info!(
        "Genesis {:?} (state root {:?})",
        chain.genesis_hash(),
        chain.genesis().state_root()
    );
    if !chain.is_bound_to_genesis() {
        warn!(
            "Chain store keeps recorded genesis {:?}",
            chain.store().genesis_hash()
        );
    }

    chain.close();
    info!("Shutdown complete");
    Ok(())
}
