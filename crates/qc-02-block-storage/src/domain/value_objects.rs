//! # Value Objects
//!
//! Key layout and open-time policy for the chain store.

use shared_types::{Address, Hash};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Progress reporter invoked while a fresh store is populated with the
/// genesis allocation: `(accounts_written, accounts_total)`.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// What to do when the configured data directory already holds a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WithExisting {
    /// Reuse stored data as-is. A genesis mismatch is logged, not fatal.
    #[default]
    Trust,
    /// Reuse stored data after re-checking it. A genesis mismatch is fatal.
    Verify,
    /// Discard stored data and rebuild from the configured genesis.
    Kill,
}

impl fmt::Display for WithExisting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WithExisting::Trust => "trust",
            WithExisting::Verify => "verify",
            WithExisting::Kill => "kill",
        };
        f.write_str(s)
    }
}

impl FromStr for WithExisting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trust" => Ok(WithExisting::Trust),
            "verify" => Ok(WithExisting::Verify),
            "kill" => Ok(WithExisting::Kill),
            other => Err(format!(
                "unknown existing-data policy '{}' (expected trust, verify or kill)",
                other
            )),
        }
    }
}

/// Key namespaces in the underlying key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// `b:` + block hash -> `StoredBlock`
    Block,
    /// `h:` + big-endian height -> block hash
    Height,
    /// `a:` + address -> `AccountState`
    Account,
    /// `m:metadata` -> `StorageMetadata`
    Metadata,
}

impl KeyPrefix {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Block => b"b:",
            KeyPrefix::Height => b"h:",
            KeyPrefix::Account => b"a:",
            KeyPrefix::Metadata => b"m:",
        }
    }

    pub fn block_key(hash: &Hash) -> Vec<u8> {
        Self::Block.with_suffix(hash.as_bytes())
    }

    pub fn height_key(height: u64) -> Vec<u8> {
        Self::Height.with_suffix(&height.to_be_bytes())
    }

    pub fn account_key(address: &Address) -> Vec<u8> {
        Self::Account.with_suffix(address.as_bytes())
    }

    pub fn metadata_key() -> Vec<u8> {
        Self::Metadata.with_suffix(b"metadata")
    }

    fn with_suffix(&self, suffix: &[u8]) -> Vec<u8> {
        let prefix = self.as_bytes();
        let mut key = Vec::with_capacity(prefix.len() + suffix.len());
        key.extend_from_slice(prefix);
        key.extend_from_slice(suffix);
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_existing_parse() {
        assert_eq!("trust".parse::<WithExisting>(), Ok(WithExisting::Trust));
        assert_eq!("Verify".parse::<WithExisting>(), Ok(WithExisting::Verify));
        assert_eq!(" kill ".parse::<WithExisting>(), Ok(WithExisting::Kill));
        assert!("wipe".parse::<WithExisting>().is_err());
    }

    #[test]
    fn test_with_existing_display_parses_back() {
        for policy in [WithExisting::Trust, WithExisting::Verify, WithExisting::Kill] {
            assert_eq!(policy.to_string().parse::<WithExisting>(), Ok(policy));
        }
        assert_eq!(WithExisting::default(), WithExisting::Trust);
    }

    #[test]
    fn test_key_layout() {
        let hash = Hash::repeat_byte(0xAA);
        let key = KeyPrefix::block_key(&hash);
        assert_eq!(&key[..2], b"b:");
        assert_eq!(&key[2..], hash.as_bytes());

        assert_eq!(KeyPrefix::height_key(0), b"h:\0\0\0\0\0\0\0\0".to_vec());
        assert_eq!(KeyPrefix::metadata_key(), b"m:metadata".to_vec());
        assert_eq!(KeyPrefix::account_key(&Address::zero()).len(), 22);
    }
}
