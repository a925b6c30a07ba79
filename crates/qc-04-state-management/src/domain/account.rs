//! # Account Commitments
//!
//! Trie encoding of genesis accounts and the state root over an
//! `AccountMap`.
//!
//! ## Encoding
//!
//! - Account: `rlp([nonce, balance, storage_root, code_hash])`
//! - State trie: `keccak(address) -> rlp(account)`
//! - Storage trie: `keccak(slot) -> rlp(value as minimal integer)`, zero
//!   values omitted

use primitive_types::U256;
use rlp::RlpStream;
use shared_types::{AccountMap, AccountState, Hash, StorageMap};
use tracing::debug;

use super::trie::sec_trie_root;

/// RLP-encode an account for insertion into the state trie.
pub fn account_rlp(account: &AccountState) -> Vec<u8> {
    let mut stream = RlpStream::new_list(4);
    stream.append(&account.nonce);
    stream.append(&account.balance);
    stream.append(&storage_root(&account.storage));
    stream.append(&account.code_hash());
    stream.out().to_vec()
}

/// Root of an account's storage trie.
pub fn storage_root(storage: &StorageMap) -> Hash {
    sec_trie_root(
        storage
            .iter()
            .filter(|(_, value)| !value.is_zero())
            .map(|(slot, value)| {
                let value = U256::from_big_endian(value.as_bytes());
                (*slot, rlp::encode(&value).to_vec())
            }),
    )
}

/// State root committing to every account in `accounts`.
pub fn state_root(accounts: &AccountMap) -> Hash {
    let root = sec_trie_root(
        accounts
            .iter()
            .map(|(address, account)| (*address, account_rlp(account))),
    );
    debug!(accounts = accounts.len(), root = ?root, "computed state root");
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{H160, H256, EMPTY_CODE_HASH, EMPTY_TRIE_ROOT};

    #[test]
    fn test_empty_state_root() {
        assert_eq!(state_root(&AccountMap::new()), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_empty_storage_root() {
        assert_eq!(storage_root(&StorageMap::new()), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_zero_storage_values_are_skipped() {
        let mut storage = StorageMap::new();
        storage.insert(H256::from_low_u64_be(1), H256::zero());
        assert_eq!(storage_root(&storage), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_empty_account_encoding() {
        let encoded = account_rlp(&AccountState::default());
        let rlp = rlp::Rlp::new(&encoded);
        assert_eq!(rlp.item_count().unwrap(), 4);
        assert_eq!(rlp.val_at::<U256>(0).unwrap(), U256::zero());
        assert_eq!(rlp.val_at::<U256>(1).unwrap(), U256::zero());
        assert_eq!(rlp.val_at::<H256>(2).unwrap(), EMPTY_TRIE_ROOT);
        assert_eq!(rlp.val_at::<H256>(3).unwrap(), EMPTY_CODE_HASH);
    }

    #[test]
    fn test_state_root_depends_on_balance() {
        let mut a = AccountMap::new();
        a.insert(H160::repeat_byte(1), AccountState::new(U256::from(100)));
        let mut b = AccountMap::new();
        b.insert(H160::repeat_byte(1), AccountState::new(U256::from(101)));
        assert_ne!(state_root(&a), state_root(&b));
        assert_ne!(state_root(&a), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_state_root_depends_on_storage() {
        let plain = AccountState::new(U256::one());
        let with_slot = plain
            .clone()
            .with_storage(H256::from_low_u64_be(1), H256::from_low_u64_be(7));

        let mut a = AccountMap::new();
        a.insert(H160::repeat_byte(3), plain);
        let mut b = AccountMap::new();
        b.insert(H160::repeat_byte(3), with_slot);

        assert_ne!(state_root(&a), state_root(&b));
    }

    #[test]
    fn test_state_root_is_deterministic() {
        let mut accounts = AccountMap::new();
        for i in 1..=16u64 {
            accounts.insert(
                H160::from_low_u64_be(i),
                AccountState::new(U256::from(i) << 100),
            );
        }
        assert_eq!(state_root(&accounts), state_root(&accounts.clone()));
    }
}
