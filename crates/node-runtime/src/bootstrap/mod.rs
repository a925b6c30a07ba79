//! # Chain Bootstrap
//!
//! Binds a chain store to the configured genesis.

pub mod chain;

pub use chain::{BootstrapError, CanonChain};
