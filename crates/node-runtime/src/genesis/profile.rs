//! # Genesis Profiles
//!
//! Default header values and initial allocations, one set per engine
//! family. These are consensus constants: changing any of them changes the
//! genesis hash and therefore the chain.

use std::sync::OnceLock;

use primitive_types::{H160, U256};
use shared_types::{AccountMap, AccountState, Hash, EMPTY_TRIE_ROOT};
use tracing::debug;

/// Lowest gas limit an operator may force.
pub const MIN_GAS_LIMIT: u64 = 5000;

/// Extra data is bounded like any other header's.
pub const MAX_EXTRA_DATA_SIZE: usize = 32;

/// Upper bound on an operator-supplied state description.
pub const MAX_STATE_DESCRIPTION_SIZE: usize = 16 * 1024 * 1024;

/// Starting difficulty of the Ethash chain (2^17).
pub const ETHASH_GENESIS_DIFFICULTY: u64 = 131_072;

/// Starting gas limit of the Ethash chain.
pub const ETHASH_GENESIS_GAS_LIMIT: u64 = 5000;

/// Extra data of the Ethash genesis header.
pub const ETHASH_GENESIS_EXTRA_DATA: [u8; 32] = [
    0x11, 0xbb, 0xe8, 0xdb, 0x4e, 0x34, 0x7b, 0x4e, 0x8c, 0x93, 0x7c, 0x1c, 0x83, 0x70, 0xe4, 0xb5,
    0xed, 0x33, 0xad, 0xb3, 0xdb, 0x69, 0xcb, 0xdb, 0x7a, 0x38, 0xe1, 0xe5, 0x0b, 0x1b, 0x82, 0xfa,
];

/// Balance of each pre-funded Ethash genesis account, in bits (2^200 wei).
const ETHASH_PREFUND_SHIFT: usize = 200;

/// Number of precompiled contract addresses (0x01..=0x04) seeded with 1 wei.
const PRECOMPILE_COUNT: u64 = 4;

/// Pre-funded accounts of the Ethash genesis.
const ETHASH_PREFUNDED: [H160; 8] = [
    // 0xdbdbdb2cbd23b783741e8d7fcf51e459b497e4a6
    H160([
        0xdb, 0xdb, 0xdb, 0x2c, 0xbd, 0x23, 0xb7, 0x83, 0x74, 0x1e,
        0x8d, 0x7f, 0xcf, 0x51, 0xe4, 0x59, 0xb4, 0x97, 0xe4, 0xa6,
    ]),
    // 0xe6716f9544a56c530d868e4bfbacb172315bdead
    H160([
        0xe6, 0x71, 0x6f, 0x95, 0x44, 0xa5, 0x6c, 0x53, 0x0d, 0x86,
        0x8e, 0x4b, 0xfb, 0xac, 0xb1, 0x72, 0x31, 0x5b, 0xde, 0xad,
    ]),
    // 0xb9c015918bdaba24b4ff057a92a3873d6eb201be
    H160([
        0xb9, 0xc0, 0x15, 0x91, 0x8b, 0xda, 0xba, 0x24, 0xb4, 0xff,
        0x05, 0x7a, 0x92, 0xa3, 0x87, 0x3d, 0x6e, 0xb2, 0x01, 0xbe,
    ]),
    // 0x1a26338f0d905e295fccb71fa9ea849ffa12aaf4
    H160([
        0x1a, 0x26, 0x33, 0x8f, 0x0d, 0x90, 0x5e, 0x29, 0x5f, 0xcc,
        0xb7, 0x1f, 0xa9, 0xea, 0x84, 0x9f, 0xfa, 0x12, 0xaa, 0xf4,
    ]),
    // 0x2ef47100e0787b915105fd5e3f4ff6752079d5cb
    H160([
        0x2e, 0xf4, 0x71, 0x00, 0xe0, 0x78, 0x7b, 0x91, 0x51, 0x05,
        0xfd, 0x5e, 0x3f, 0x4f, 0xf6, 0x75, 0x20, 0x79, 0xd5, 0xcb,
    ]),
    // 0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826
    H160([
        0xcd, 0x2a, 0x3d, 0x9f, 0x93, 0x8e, 0x13, 0xcd, 0x94, 0x7e,
        0xc0, 0x5a, 0xbc, 0x7f, 0xe7, 0x34, 0xdf, 0x8d, 0xd8, 0x26,
    ]),
    // 0x6c386a4b26f73c802f34673f7248bb118f97424a
    H160([
        0x6c, 0x38, 0x6a, 0x4b, 0x26, 0xf7, 0x3c, 0x80, 0x2f, 0x34,
        0x67, 0x3f, 0x72, 0x48, 0xbb, 0x11, 0x8f, 0x97, 0x42, 0x4a,
    ]),
    // 0xe4157b34ea9615cfbde6b4fda419828124b70c78
    H160([
        0xe4, 0x15, 0x7b, 0x34, 0xea, 0x96, 0x15, 0xcf, 0xbd, 0xe6,
        0xb4, 0xfd, 0xa4, 0x19, 0x82, 0x81, 0x24, 0xb7, 0x0c, 0x78,
    ]),
];

static ETHASH_DEFAULT_ROOT: OnceLock<Hash> = OnceLock::new();

/// Family of genesis defaults selected by the seal engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenesisProfile {
    /// Engines without a dedicated chain (`NoProof`, `BasicAuthority`).
    Generic,
    /// The Ethash proof-of-work chain.
    Ethash,
}

impl GenesisProfile {
    pub fn difficulty(&self) -> U256 {
        match self {
            GenesisProfile::Generic => U256::one(),
            GenesisProfile::Ethash => U256::from(ETHASH_GENESIS_DIFFICULTY),
        }
    }

    pub fn gas_limit(&self) -> U256 {
        match self {
            GenesisProfile::Generic => U256::one() << 255,
            GenesisProfile::Ethash => U256::from(ETHASH_GENESIS_GAS_LIMIT),
        }
    }

    pub fn extra_data(&self) -> Vec<u8> {
        match self {
            GenesisProfile::Generic => Vec::new(),
            GenesisProfile::Ethash => ETHASH_GENESIS_EXTRA_DATA.to_vec(),
        }
    }

    /// Allocation used when no state description is configured.
    pub fn default_allocation(&self) -> AccountMap {
        match self {
            GenesisProfile::Generic => AccountMap::new(),
            GenesisProfile::Ethash => {
                let mut accounts: AccountMap = (1..=PRECOMPILE_COUNT)
                    .map(|i| (H160::from_low_u64_be(i), AccountState::new(U256::one())))
                    .collect();
                let prefund = U256::one() << ETHASH_PREFUND_SHIFT;
                for address in ETHASH_PREFUNDED {
                    accounts.insert(address, AccountState::new(prefund));
                }
                accounts
            }
        }
    }

    /// State root of `default_allocation()`, computed at most once per
    /// process.
    pub fn default_state_root(&self) -> Hash {
        match self {
            GenesisProfile::Generic => EMPTY_TRIE_ROOT,
            GenesisProfile::Ethash => *ETHASH_DEFAULT_ROOT.get_or_init(|| {
                let root = qc_04_state_management::state_root(&self.default_allocation());
                debug!(root = ?root, "Computed default Ethash genesis state root");
                root
            }),
        }
    }
}
