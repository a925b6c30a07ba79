//! # Core Domain Entities
//!
//! Hashes, addresses and the account state that makes up a genesis
//! allocation.
//!
//! ## Type Decisions
//!
//! - `balance: U256` - genesis allocations routinely exceed `u128` (the
//!   default Ethash allocation funds accounts with 2^200 wei).
//! - `AccountMap` is a `BTreeMap` so iteration order is identical on every
//!   node; genesis bytes must never depend on hash-map seeds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crypto::keccak256;

// Re-export fixed-size primitives for use across all crates
pub use primitive_types::{H160, H256, U256};

/// A 32-byte Keccak-256 hash.
pub type Hash = H256;

/// A 20-byte account address.
pub type Address = H160;

/// Ordered account storage: slot -> value.
pub type StorageMap = BTreeMap<H256, H256>;

/// Initial account state of a chain, keyed by address.
pub type AccountMap = BTreeMap<Address, AccountState>;

/// RLP encoding of an empty list.
pub const RLP_EMPTY_LIST: [u8; 1] = [0xc0];

/// RLP encoding of an empty byte string.
pub const RLP_NULL: [u8; 1] = [0x80];

/// Keccak256 hash of an empty RLP-encoded trie.
/// Value: keccak256(RLP("")) = 0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421
pub const EMPTY_TRIE_ROOT: Hash = H256([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);

/// Keccak256 hash of an RLP-encoded empty list (the uncles hash of a block
/// without uncles).
/// Value: keccak256(RLP([])) = 0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347
pub const EMPTY_LIST_HASH: Hash = H256([
    0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a, 0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc, 0xd4, 0x1a,
    0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13, 0xf0, 0xa1, 0x42, 0xfd, 0x40, 0xd4, 0x93, 0x47,
]);

/// Keccak256 hash of empty code, shared by every externally owned account.
/// Value: keccak256("") = 0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470
pub const EMPTY_CODE_HASH: Hash = H256([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Account state as allocated at genesis.
///
/// The trie commitment of an account is `[nonce, balance, storage_root,
/// code_hash]`; storage and code are kept in full here so the storage root
/// and code hash can be derived.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Account balance in wei.
    pub balance: U256,
    /// Transaction nonce.
    pub nonce: U256,
    /// Contract bytecode. Empty for externally owned accounts.
    pub code: Vec<u8>,
    /// Initial contract storage.
    pub storage: StorageMap,
}

impl AccountState {
    /// Create an externally owned account with the specified balance.
    pub fn new(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Builder method to set nonce.
    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    /// Builder method to set contract code.
    pub fn with_code(mut self, code: Vec<u8>) -> Self {
        self.code = code;
        self
    }

    /// Builder method to set a storage slot.
    pub fn with_storage(mut self, slot: H256, value: H256) -> Self {
        self.storage.insert(slot, value);
        self
    }

    /// Keccak256 of the contract code.
    pub fn code_hash(&self) -> Hash {
        if self.code.is_empty() {
            EMPTY_CODE_HASH
        } else {
            keccak256(&self.code)
        }
    }

    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }
}

/// Sum of every balance in `accounts`.
///
/// Saturates at `U256::MAX`; no realistic allocation gets there.
pub fn total_balance(accounts: &AccountMap) -> U256 {
    accounts
        .values()
        .fold(U256::zero(), |acc, account| acc.saturating_add(account.balance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_account_is_empty_eoa() {
        let account = AccountState::default();
        assert!(account.balance.is_zero());
        assert!(account.nonce.is_zero());
        assert!(!account.has_code());
        assert_eq!(account.code_hash(), EMPTY_CODE_HASH);
    }

    #[test]
    fn test_code_hash_changes_with_code() {
        let account = AccountState::new(U256::one()).with_code(vec![0x60, 0x00]);
        assert_ne!(account.code_hash(), EMPTY_CODE_HASH);
    }

    #[test]
    fn test_total_balance() {
        let mut accounts = AccountMap::new();
        accounts.insert(H160::repeat_byte(1), AccountState::new(U256::from(100)));
        accounts.insert(H160::repeat_byte(2), AccountState::new(U256::from(250)));
        assert_eq!(total_balance(&accounts), U256::from(350));
        assert_eq!(total_balance(&AccountMap::new()), U256::zero());
    }

    #[test]
    fn test_account_map_iterates_in_address_order() {
        let mut accounts = AccountMap::new();
        accounts.insert(H160::repeat_byte(9), AccountState::default());
        accounts.insert(H160::repeat_byte(1), AccountState::default());
        let keys: Vec<_> = accounts.keys().copied().collect();
        assert_eq!(keys, vec![H160::repeat_byte(1), H160::repeat_byte(9)]);
    }
}
