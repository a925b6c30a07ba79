//! # Genesis Block Builder
//!
//! Builds the genesis block from a seal engine and a snapshot of overrides.
//! Output is a pure function of those two inputs.
//!
//! ## Layout
//!
//! ```text
//! block  = [header, [], []]
//! header = [parent_hash, uncles_hash, coinbase, state_root, transactions_root,
//!           receipts_root, log_bloom, difficulty, number, gas_limit, gas_used,
//!           timestamp, extra_data, seal_0, ..., seal_n]
//! ```
//!
//! The genesis hash, and with it the chain identity, is the Keccak256 of
//! the header's RLP encoding.

use primitive_types::{H160, U256};
use rlp::{Rlp, RlpStream};
use shared_types::{
    keccak256, AccountMap, Hash, EMPTY_LIST_HASH, EMPTY_TRIE_ROOT, RLP_EMPTY_LIST,
};
use thiserror::Error;
use tracing::debug;

use super::allocation::parse_state_description;
use super::overrides::GenesisOverrides;
use super::profile::GenesisProfile;
use super::sealer::SealEngine;

/// Number of header fields preceding the seal fields.
pub const HEADER_FIELD_COUNT: usize = 13;

/// Size of the log bloom in bytes.
pub const LOG_BLOOM_SIZE: usize = 256;

/// Genesis block creation errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// The configured state description could not be parsed.
    #[error("Invalid genesis state description: {0}")]
    InvalidStateDescription(String),

    /// An override value is out of range.
    #[error("Invalid genesis override: {0}")]
    InvalidOverride(String),

    /// Genesis bytes could not be decoded.
    #[error("Malformed genesis encoding: {0}")]
    Encoding(String),
}

impl From<rlp::DecoderError> for GenesisError {
    fn from(err: rlp::DecoderError) -> Self {
        GenesisError::Encoding(err.to_string())
    }
}

/// Decoded genesis header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisHeader {
    pub parent_hash: Hash,
    pub uncles_hash: Hash,
    pub coinbase: H160,
    pub state_root: Hash,
    pub transactions_root: Hash,
    pub receipts_root: Hash,
    pub log_bloom: Vec<u8>,
    pub difficulty: U256,
    pub number: U256,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub timestamp: U256,
    pub extra_data: Vec<u8>,
    /// Engine seal fields, each RLP-encoded.
    pub seal: Vec<Vec<u8>>,
}

impl GenesisHeader {
    /// RLP encoding of the header list, seal fields included.
    pub fn rlp_bytes(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(HEADER_FIELD_COUNT + self.seal.len());
        stream.append(&self.parent_hash);
        stream.append(&self.uncles_hash);
        stream.append(&self.coinbase);
        stream.append(&self.state_root);
        stream.append(&self.transactions_root);
        stream.append(&self.receipts_root);
        stream.append(&self.log_bloom);
        stream.append(&self.difficulty);
        stream.append(&self.number);
        stream.append(&self.gas_limit);
        stream.append(&self.gas_used);
        stream.append(&self.timestamp);
        stream.append(&self.extra_data);
        for field in &self.seal {
            stream.append_raw(field, 1);
        }
        stream.out().to_vec()
    }

    pub fn hash(&self) -> Hash {
        keccak256(&self.rlp_bytes())
    }

    /// Decode the header out of an encoded genesis block.
    pub fn decode_block(block: &[u8]) -> Result<Self, GenesisError> {
        let block = Rlp::new(block);
        if block.item_count()? != 3 {
            return Err(GenesisError::Encoding(
                "block must have three items".to_string(),
            ));
        }
        let header = block.at(0)?;
        let items = header.item_count()?;
        if items < HEADER_FIELD_COUNT {
            return Err(GenesisError::Encoding(format!(
                "header has {} fields, expected at least {}",
                items, HEADER_FIELD_COUNT
            )));
        }

        let seal = (HEADER_FIELD_COUNT..items)
            .map(|i| header.at(i).map(|item| item.as_raw().to_vec()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            parent_hash: header.val_at(0)?,
            uncles_hash: header.val_at(1)?,
            coinbase: header.val_at(2)?,
            state_root: header.val_at(3)?,
            transactions_root: header.val_at(4)?,
            receipts_root: header.val_at(5)?,
            log_bloom: header.val_at(6)?,
            difficulty: header.val_at(7)?,
            number: header.val_at(8)?,
            gas_limit: header.val_at(9)?,
            gas_used: header.val_at(10)?,
            timestamp: header.val_at(11)?,
            extra_data: header.val_at(12)?,
            seal,
        })
    }
}

/// A fully built genesis: header, encoded block and initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisBlock {
    pub header: GenesisHeader,
    /// Keccak256 of the header encoding.
    pub hash: Hash,
    /// Encoded block `[header, [], []]`.
    pub bytes: Vec<u8>,
    /// Initial account state committed to by `header.state_root`.
    pub state: AccountMap,
}

impl GenesisBlock {
    pub fn state_root(&self) -> Hash {
        self.header.state_root
    }
}

/// Builder for the genesis of one seal engine under one overrides snapshot.
pub struct GenesisBuilder<'a> {
    engine: &'a dyn SealEngine,
    overrides: GenesisOverrides,
}

impl<'a> GenesisBuilder<'a> {
    pub fn new(engine: &'a dyn SealEngine, overrides: GenesisOverrides) -> Self {
        Self { engine, overrides }
    }

    pub fn profile(&self) -> GenesisProfile {
        self.engine.profile()
    }

    /// Initial allocation: the profile default, or the parsed state
    /// description when one is configured.
    pub fn build_genesis_state(&self) -> Result<AccountMap, GenesisError> {
        match &self.overrides.state_description {
            Some(description) => parse_state_description(description),
            None => Ok(self.profile().default_allocation()),
        }
    }

    /// State root of the default allocation, or `None` when a state
    /// description makes it unknowable without building the state.
    pub fn known_genesis_state_root(&self) -> Option<Hash> {
        if self.overrides.state_description.is_some() {
            return None;
        }
        Some(self.profile().default_state_root())
    }

    /// Encoded genesis block.
    pub fn build_genesis_bytes(&self) -> Result<Vec<u8>, GenesisError> {
        Ok(self.build()?.bytes)
    }

    pub fn build(&self) -> Result<GenesisBlock, GenesisError> {
        self.overrides.validate()?;

        let state = self.build_genesis_state()?;
        let state_root = match self.known_genesis_state_root() {
            Some(root) => root,
            None if state.is_empty() => EMPTY_TRIE_ROOT,
            None => qc_04_state_management::state_root(&state),
        };

        let header = self.header(state_root);
        let header_bytes = header.rlp_bytes();
        let hash = keccak256(&header_bytes);

        let mut block = RlpStream::new_list(3);
        block.append_raw(&header_bytes, 1);
        block.append_raw(&RLP_EMPTY_LIST, 1);
        block.append_raw(&RLP_EMPTY_LIST, 1);
        let bytes = block.out().to_vec();

        debug!(
            engine = self.engine.name(),
            hash = ?hash,
            accounts = state.len(),
            "Built genesis block"
        );

        Ok(GenesisBlock {
            header,
            hash,
            bytes,
            state,
        })
    }

    fn header(&self, state_root: Hash) -> GenesisHeader {
        let profile = self.profile();
        let extra_data = if self.overrides.extra_data.is_empty() {
            profile.extra_data()
        } else {
            self.overrides.extra_data.clone()
        };

        GenesisHeader {
            parent_hash: Hash::zero(),
            uncles_hash: EMPTY_LIST_HASH,
            coinbase: H160::zero(),
            state_root,
            transactions_root: EMPTY_TRIE_ROOT,
            receipts_root: EMPTY_TRIE_ROOT,
            log_bloom: vec![0u8; LOG_BLOOM_SIZE],
            difficulty: self.overrides.difficulty.unwrap_or_else(|| profile.difficulty()),
            number: U256::zero(),
            gas_limit: self.overrides.gas_limit.unwrap_or_else(|| profile.gas_limit()),
            gas_used: U256::zero(),
            timestamp: U256::zero(),
            extra_data,
            seal: self.engine.genesis_seal_fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::sealer::{BasicAuthority, EthashSeal, NoProof};
    use shared_types::total_balance;

    fn build(engine: &dyn SealEngine, overrides: GenesisOverrides) -> GenesisBlock {
        GenesisBuilder::new(engine, overrides).build().unwrap()
    }

    #[test]
    fn test_noproof_genesis_layout() {
        let genesis = build(&NoProof, GenesisOverrides::default());
        let header = GenesisHeader::decode_block(&genesis.bytes).unwrap();

        assert_eq!(header, genesis.header);
        assert_eq!(header.parent_hash, Hash::zero());
        assert_eq!(header.uncles_hash, EMPTY_LIST_HASH);
        assert_eq!(header.coinbase, H160::zero());
        assert_eq!(header.state_root, EMPTY_TRIE_ROOT);
        assert_eq!(header.transactions_root, EMPTY_TRIE_ROOT);
        assert_eq!(header.receipts_root, EMPTY_TRIE_ROOT);
        assert_eq!(header.log_bloom, vec![0u8; LOG_BLOOM_SIZE]);
        assert_eq!(header.difficulty, U256::one());
        assert_eq!(header.number, U256::zero());
        assert_eq!(header.gas_limit, U256::one() << 255);
        assert_eq!(header.gas_used, U256::zero());
        assert_eq!(header.timestamp, U256::zero());
        assert!(header.extra_data.is_empty());
        assert!(header.seal.is_empty());
        assert!(genesis.state.is_empty());
    }

    #[test]
    fn test_block_body_is_two_empty_lists() {
        let genesis = build(&NoProof, GenesisOverrides::default());
        let rlp = Rlp::new(&genesis.bytes);

        assert_eq!(rlp.item_count().unwrap(), 3);
        assert_eq!(rlp.at(1).unwrap().as_raw(), &RLP_EMPTY_LIST);
        assert_eq!(rlp.at(2).unwrap().as_raw(), &RLP_EMPTY_LIST);
        assert_eq!(keccak256(rlp.at(0).unwrap().as_raw()), genesis.hash);
    }

    #[test]
    fn test_seal_fields_follow_header_fields() {
        let basic = build(&BasicAuthority, GenesisOverrides::default());
        assert_eq!(basic.header.seal, BasicAuthority.genesis_seal_fields());
        assert_eq!(
            Rlp::new(&basic.bytes).at(0).unwrap().item_count().unwrap(),
            HEADER_FIELD_COUNT + 1
        );

        let ethash = build(&EthashSeal, GenesisOverrides::default());
        assert_eq!(
            Rlp::new(&ethash.bytes).at(0).unwrap().item_count().unwrap(),
            HEADER_FIELD_COUNT + 2
        );
        assert_ne!(basic.hash, ethash.hash);
    }

    #[test]
    fn test_engines_share_generic_defaults_but_not_hash() {
        let noproof = build(&NoProof, GenesisOverrides::default());
        let basic = build(&BasicAuthority, GenesisOverrides::default());
        assert_eq!(noproof.header.difficulty, basic.header.difficulty);
        assert_ne!(noproof.hash, basic.hash);
    }

    #[test]
    fn test_ethash_genesis() {
        let genesis = build(&EthashSeal, GenesisOverrides::default());
        let header = &genesis.header;

        assert_eq!(header.difficulty, U256::from(131_072));
        assert_eq!(header.gas_limit, U256::from(5000));
        assert_eq!(header.extra_data.len(), 32);
        assert_eq!(genesis.state.len(), 12);
        assert_eq!(
            total_balance(&genesis.state),
            U256::from(4) + (U256::from(8) << 200)
        );
        assert_eq!(
            header.state_root,
            qc_04_state_management::state_root(&genesis.state)
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let overrides = GenesisOverrides {
            extra_data: b"determinism".to_vec(),
            difficulty: Some(U256::from(99)),
            ..Default::default()
        };
        let a = GenesisBuilder::new(&EthashSeal, overrides.clone())
            .build_genesis_bytes()
            .unwrap();
        let b = GenesisBuilder::new(&EthashSeal, overrides)
            .build_genesis_bytes()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_overrides_replace_fields_in_place() {
        let overrides = GenesisOverrides {
            extra_data: b"quantum".to_vec(),
            difficulty: Some(U256::from(12345)),
            gas_limit: Some(U256::from(8_000_000)),
            state_description: None,
        };
        let genesis = build(&EthashSeal, overrides);
        let header = GenesisHeader::decode_block(&genesis.bytes).unwrap();

        assert_eq!(header.extra_data, b"quantum".to_vec());
        assert_eq!(header.difficulty, U256::from(12345));
        assert_eq!(header.gas_limit, U256::from(8_000_000));
        assert_eq!(header.number, U256::zero());
        assert_eq!(header.seal, EthashSeal.genesis_seal_fields());
    }

    #[test]
    fn test_state_description_replaces_allocation() {
        let overrides = GenesisOverrides {
            state_description: Some(
                r#"{ "0x00000000000000000000000000000000000000aa": { "balance": "5" } }"#
                    .to_string(),
            ),
            ..Default::default()
        };
        let builder = GenesisBuilder::new(&EthashSeal, overrides);
        assert_eq!(builder.known_genesis_state_root(), None);

        let genesis = builder.build().unwrap();
        assert_eq!(genesis.state.len(), 1);
        assert_eq!(
            genesis.state_root(),
            qc_04_state_management::state_root(&genesis.state)
        );
        assert_ne!(genesis.state_root(), GenesisProfile::Ethash.default_state_root());
    }

    #[test]
    fn test_empty_state_description_gives_empty_root() {
        let overrides = GenesisOverrides {
            state_description: Some("{}".to_string()),
            ..Default::default()
        };
        let genesis = build(&EthashSeal, overrides);
        assert!(genesis.state.is_empty());
        assert_eq!(genesis.state_root(), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_malformed_state_description_is_fatal() {
        let overrides = GenesisOverrides {
            state_description: Some("{ not json".to_string()),
            ..Default::default()
        };
        let builder = GenesisBuilder::new(&NoProof, overrides);
        assert!(matches!(
            builder.build_genesis_state(),
            Err(GenesisError::InvalidStateDescription(_))
        ));
        assert!(matches!(
            builder.build(),
            Err(GenesisError::InvalidStateDescription(_))
        ));
    }

    #[test]
    fn test_known_root_without_overrides() {
        let builder = GenesisBuilder::new(&NoProof, GenesisOverrides::default());
        assert_eq!(builder.known_genesis_state_root(), Some(EMPTY_TRIE_ROOT));

        let builder = GenesisBuilder::new(&EthashSeal, GenesisOverrides::default());
        assert_eq!(
            builder.known_genesis_state_root(),
            Some(GenesisProfile::Ethash.default_state_root())
        );
    }

    #[test]
    fn test_invalid_snapshot_is_rejected() {
        let overrides = GenesisOverrides {
            difficulty: Some(U256::zero()),
            ..Default::default()
        };
        assert!(matches!(
            GenesisBuilder::new(&NoProof, overrides).build(),
            Err(GenesisError::InvalidOverride(_))
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(GenesisHeader::decode_block(&[0xc0]).is_err());
        assert!(GenesisHeader::decode_block(&[0x01, 0x02]).is_err());
    }
}
