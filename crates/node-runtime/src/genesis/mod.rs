//! # Genesis Module
//!
//! Construction of the genesis block, the operator override registry and
//! per-engine dispatch.
//!
//! ## Flow
//!
//! ```text
//! GenesisRegistry ──snapshot──→ GenesisBuilder(engine) ──→ GenesisBlock
//!                                                              │
//!              SealerKind::genesis_provider ──→ GenericGenesis (rebuild per call)
//!                                           └─→ EthashGenesis  (GenesisCell, once)
//! ```

pub mod allocation;
pub mod builder;
pub mod cell;
pub mod ethash;
pub mod overrides;
pub mod profile;
pub mod provider;
pub mod sealer;

pub use allocation::parse_state_description;
pub use builder::{GenesisBlock, GenesisBuilder, GenesisError, GenesisHeader};
pub use cell::{CellState, GenesisCell};
pub use ethash::EthashGenesis;
pub use overrides::{GenesisOverrides, GenesisRegistry};
pub use profile::{GenesisProfile, MIN_GAS_LIMIT};
pub use provider::{GenericGenesis, GenesisProvider};
pub use sealer::{BasicAuthority, EthashSeal, NoProof, SealEngine, SealerKind};
