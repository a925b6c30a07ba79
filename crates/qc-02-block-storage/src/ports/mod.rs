//! # Ports Layer
//!
//! Driven ports required by the chain store. The store is driven directly
//! through `ChainDatabase`, so there is no separate inbound port.

pub mod outbound;
