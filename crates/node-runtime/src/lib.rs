//! # Node Runtime Library
//!
//! Genesis construction and chain bootstrap for the Quantum-Chain node.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modules
//!
//! - `genesis/` - Genesis block construction, overrides and engine dispatch
//! - `bootstrap/` - `CanonChain`, binding a chain store to the genesis
//! - `container/` - Node configuration loaded from the environment

#![allow(clippy::type_complexity)]

pub mod bootstrap;
pub mod container;
pub mod genesis;

pub use bootstrap::{BootstrapError, CanonChain};
pub use container::{ConfigError, GenesisSettings, NodeConfig, StorageConfig};
pub use genesis::{
    GenesisBlock, GenesisError, GenesisProvider, GenesisRegistry, SealEngine, SealerKind,
};
