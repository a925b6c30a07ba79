//! # Seal Engines
//!
//! A seal engine owns the engine-specific fields appended to the genesis
//! header and selects the profile of defaults the genesis is built from.
//! `SealerKind` is the closed set of engines a node can run and maps each to
//! its genesis provider.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use primitive_types::H256;

use super::ethash::EthashGenesis;
use super::overrides::GenesisRegistry;
use super::profile::GenesisProfile;
use super::provider::{GenericGenesis, GenesisProvider};

/// Length of a BasicAuthority signature (r, s, v).
pub const SIGNATURE_LENGTH: usize = 65;

/// Nonce carried by the Ethash genesis header.
pub const ETHASH_GENESIS_NONCE: u64 = 0x42;

/// Capability interface of a consensus engine, as far as genesis is
/// concerned.
pub trait SealEngine: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Defaults the genesis is built from.
    fn profile(&self) -> GenesisProfile;

    /// Seal fields of the genesis header, each already RLP-encoded.
    fn genesis_seal_fields(&self) -> Vec<Vec<u8>>;

    fn seal_field_count(&self) -> usize {
        self.genesis_seal_fields().len()
    }
}

/// No seal at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProof;

impl SealEngine for NoProof {
    fn name(&self) -> &'static str {
        "NoProof"
    }

    fn profile(&self) -> GenesisProfile {
        GenesisProfile::Generic
    }

    fn genesis_seal_fields(&self) -> Vec<Vec<u8>> {
        Vec::new()
    }
}

/// Blocks sealed by a single authority's signature. The genesis carries an
/// all-zero signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAuthority;

impl SealEngine for BasicAuthority {
    fn name(&self) -> &'static str {
        "BasicAuthority"
    }

    fn profile(&self) -> GenesisProfile {
        GenesisProfile::Generic
    }

    fn genesis_seal_fields(&self) -> Vec<Vec<u8>> {
        vec![rlp::encode(&vec![0u8; SIGNATURE_LENGTH]).to_vec()]
    }
}

/// Ethash proof of work: `[mix_hash, nonce]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EthashSeal;

impl SealEngine for EthashSeal {
    fn name(&self) -> &'static str {
        "Ethash"
    }

    fn profile(&self) -> GenesisProfile {
        GenesisProfile::Ethash
    }

    fn genesis_seal_fields(&self) -> Vec<Vec<u8>> {
        // The nonce is a fixed 8-byte value, not a minimal integer.
        let nonce = ETHASH_GENESIS_NONCE.to_be_bytes().to_vec();
        vec![
            rlp::encode(&H256::zero()).to_vec(),
            rlp::encode(&nonce).to_vec(),
        ]
    }
}

/// Engines a node can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SealerKind {
    NoProof,
    BasicAuthority,
    #[default]
    Ethash,
}

impl SealerKind {
    pub const ALL: [SealerKind; 3] = [
        SealerKind::NoProof,
        SealerKind::BasicAuthority,
        SealerKind::Ethash,
    ];

    pub fn engine(&self) -> Box<dyn SealEngine> {
        match self {
            SealerKind::NoProof => Box::new(NoProof),
            SealerKind::BasicAuthority => Box::new(BasicAuthority),
            SealerKind::Ethash => Box::new(EthashSeal),
        }
    }

    /// Genesis provider for this engine. Ethash memoizes its genesis; the
    /// generic engines rebuild it on every call.
    pub fn genesis_provider(&self, registry: Arc<GenesisRegistry>) -> Arc<dyn GenesisProvider> {
        match self {
            SealerKind::NoProof => Arc::new(GenericGenesis::new(NoProof, registry)),
            SealerKind::BasicAuthority => Arc::new(GenericGenesis::new(BasicAuthority, registry)),
            SealerKind::Ethash => Arc::new(EthashGenesis::new(registry)),
        }
    }
}

impl fmt::Display for SealerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SealerKind::NoProof => "noproof",
            SealerKind::BasicAuthority => "basic-authority",
            SealerKind::Ethash => "ethash",
        };
        f.write_str(s)
    }
}

impl FromStr for SealerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noproof" | "no-proof" => Ok(SealerKind::NoProof),
            "basic-authority" | "basicauthority" => Ok(SealerKind::BasicAuthority),
            "ethash" => Ok(SealerKind::Ethash),
            other => Err(format!(
                "unknown sealer '{}' (expected noproof, basic-authority or ethash)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_field_counts() {
        assert_eq!(NoProof.seal_field_count(), 0);
        assert_eq!(BasicAuthority.seal_field_count(), 1);
        assert_eq!(EthashSeal.seal_field_count(), 2);
    }

    #[test]
    fn test_basic_authority_signature_is_zero() {
        let fields = BasicAuthority.genesis_seal_fields();
        let sig: Vec<u8> = rlp::decode(&fields[0]).unwrap();
        assert_eq!(sig, vec![0u8; SIGNATURE_LENGTH]);
    }

    #[test]
    fn test_ethash_seal_encoding() {
        let fields = EthashSeal.genesis_seal_fields();

        let mut mix = vec![0xa0];
        mix.extend_from_slice(&[0u8; 32]);
        assert_eq!(fields[0], mix);

        assert_eq!(fields[1], vec![0x88, 0, 0, 0, 0, 0, 0, 0, 0x42]);
    }

    #[test]
    fn test_profiles() {
        assert_eq!(NoProof.profile(), GenesisProfile::Generic);
        assert_eq!(BasicAuthority.profile(), GenesisProfile::Generic);
        assert_eq!(EthashSeal.profile(), GenesisProfile::Ethash);
    }

    #[test]
    fn test_sealer_kind_parse() {
        for kind in SealerKind::ALL {
            assert_eq!(kind.to_string().parse::<SealerKind>(), Ok(kind));
        }
        assert_eq!("Ethash".parse::<SealerKind>(), Ok(SealerKind::Ethash));
        assert!("clique".parse::<SealerKind>().is_err());
        assert_eq!(SealerKind::default(), SealerKind::Ethash);
    }

    #[test]
    fn test_engine_names() {
        assert_eq!(SealerKind::NoProof.engine().name(), "NoProof");
        assert_eq!(SealerKind::BasicAuthority.engine().name(), "BasicAuthority");
        assert_eq!(SealerKind::Ethash.engine().name(), "Ethash");
    }
}
