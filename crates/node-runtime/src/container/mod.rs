//! # Node Container
//!
//! Configuration consumed by the node binary.

pub mod config;

pub use config::{ConfigError, GenesisSettings, NodeConfig, StorageConfig};
