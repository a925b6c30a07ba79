//! # qc-04-state-management
//!
//! State-root engine for Quantum-Chain genesis construction.
//!
//! ## Role in System
//!
//! - **Genesis Commitment**: derives the state root a genesis header commits
//!   to from an initial `AccountMap`
//! - **Patricia Merkle Trie**: roots are computed exactly as the canonical
//!   hex-prefix trie, so a state root derived here matches any other
//!   conforming implementation
//!
//! ## Flow
//!
//! ```text
//! AccountMap ──account_rlp──→ [keccak(address) → rlp(account)]
//!                                         │
//!                                  sec_trie_root
//!                                         ↓
//!                                    state root
//! ```
//!
//! The engine is pure: no persistence, no locks. Callers memoize roots they
//! need more than once.

pub mod domain;

pub use domain::*;
