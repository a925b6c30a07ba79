//! # Hashing
//!
//! Keccak-256, the only digest used for chain identity.

use sha3::{Digest, Keccak256};

use crate::entities::Hash;

/// Compute the Keccak-256 hash of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Hash::from_slice(&hasher.finalize())
}
