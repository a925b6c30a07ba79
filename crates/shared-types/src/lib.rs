//! # Shared Types Crate
//!
//! Primitive types and canonical constants shared by every genesis-related
//! crate in the workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: hashes, addresses and account state are
//!   defined once here.
//! - **Canonical Constants**: the empty-trie, empty-list and empty-code hashes
//!   are fixed values every node must agree on byte for byte.
//! - **Deterministic Iteration**: account and storage maps are ordered so any
//!   traversal yields the same sequence on every machine.

pub mod crypto;
pub mod entities;

pub use crypto::*;
pub use entities::*;
