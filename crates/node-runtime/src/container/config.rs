//! # Node Configuration
//!
//! Configuration is read from the environment:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `QC_DATA_DIR` | Data directory, `:memory:` for an in-memory chain | `./data` |
//! | `QC_SEALER` | `noproof`, `basic-authority` or `ethash` | `ethash` |
//! | `QC_WITH_EXISTING` | `trust`, `verify` or `kill` | `trust` |
//! | `QC_GENESIS_EXTRA_DATA` | Hex extra data (at most 32 bytes) | profile |
//! | `QC_GENESIS_DIFFICULTY` | Decimal or `0x` hex | profile |
//! | `QC_GENESIS_GAS_LIMIT` | Decimal or `0x` hex | profile |
//! | `QC_GENESIS_STATE` | Path to a JSON state description | profile |

use std::path::PathBuf;

use primitive_types::U256;
use qc_02_block_storage::WithExisting;
use thiserror::Error;
use tracing::info;

use crate::genesis::allocation::parse_u256;
use crate::genesis::{GenesisError, GenesisRegistry, SealerKind};

/// Value of `QC_DATA_DIR` selecting an in-memory chain.
pub const IN_MEMORY: &str = ":memory:";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read genesis state file {path}: {source}")]
    StateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Genesis(#[from] GenesisError),
}

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    pub storage: StorageConfig,
    pub genesis: GenesisSettings,
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Data directory for the chain store; `None` keeps the chain in memory.
    pub data_dir: Option<PathBuf>,
    /// Policy for data already present in `data_dir`.
    pub existing: WithExisting,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from("./data")),
            existing: WithExisting::Trust,
        }
    }
}

/// Genesis selection and overrides.
#[derive(Debug, Clone, Default)]
pub struct GenesisSettings {
    pub sealer: SealerKind,
    pub extra_data: Option<Vec<u8>>,
    pub difficulty: Option<U256>,
    pub gas_limit: Option<U256>,
    /// JSON state description, read when the settings are applied.
    pub state_file: Option<PathBuf>,
}

impl GenesisSettings {
    /// Push every configured override into `registry`.
    pub fn apply_to(&self, registry: &GenesisRegistry) -> Result<(), ConfigError> {
        if let Some(extra_data) = &self.extra_data {
            registry.force_extra_data(extra_data.clone())?;
        }
        if let Some(difficulty) = self.difficulty {
            registry.force_difficulty(difficulty)?;
        }
        if let Some(gas_limit) = self.gas_limit {
            registry.force_gas_limit(gas_limit)?;
        }
        if let Some(path) = &self.state_file {
            let description =
                std::fs::read_to_string(path).map_err(|source| ConfigError::StateFile {
                    path: path.clone(),
                    source,
                })?;
            info!("Loaded genesis state description from {}", path.display());
            registry.set_state_override(description)?;
        }
        Ok(())
    }
}

impl NodeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value. Unset and empty variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = NodeConfig::default();

        if let Some(dir) = get("QC_DATA_DIR") {
            config.storage.data_dir = if dir == IN_MEMORY {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        if let Some(value) = get("QC_WITH_EXISTING") {
            config.storage.existing = value
                .parse()
                .map_err(|reason| invalid("QC_WITH_EXISTING", &value, reason))?;
        }
        if let Some(value) = get("QC_SEALER") {
            config.genesis.sealer = value
                .parse()
                .map_err(|reason| invalid("QC_SEALER", &value, reason))?;
        }
        if let Some(value) = get("QC_GENESIS_EXTRA_DATA") {
            let raw = value.trim_start_matches("0x");
            let bytes = hex::decode(raw)
                .map_err(|e| invalid("QC_GENESIS_EXTRA_DATA", &value, e.to_string()))?;
            config.genesis.extra_data = Some(bytes);
        }
        if let Some(value) = get("QC_GENESIS_DIFFICULTY") {
            config.genesis.difficulty = Some(
                parse_u256(&value).map_err(|reason| invalid("QC_GENESIS_DIFFICULTY", &value, reason))?,
            );
        }
        if let Some(value) = get("QC_GENESIS_GAS_LIMIT") {
            config.genesis.gas_limit = Some(
                parse_u256(&value).map_err(|reason| invalid("QC_GENESIS_GAS_LIMIT", &value, reason))?,
            );
        }
        if let Some(path) = get("QC_GENESIS_STATE") {
            config.genesis.state_file = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

fn invalid(var: &'static str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = NodeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("./data")));
        assert_eq!(config.storage.existing, WithExisting::Trust);
        assert_eq!(config.genesis.sealer, SealerKind::Ethash);
        assert!(config.genesis.extra_data.is_none());
        assert!(config.genesis.state_file.is_none());
    }

    #[test]
    fn test_full_environment() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("QC_DATA_DIR", "/var/lib/qc"),
            ("QC_WITH_EXISTING", "verify"),
            ("QC_SEALER", "basic-authority"),
            ("QC_GENESIS_EXTRA_DATA", "0xcafe"),
            ("QC_GENESIS_DIFFICULTY", "0x20000"),
            ("QC_GENESIS_GAS_LIMIT", "3141592"),
            ("QC_GENESIS_STATE", "/etc/qc/genesis.json"),
        ]))
        .unwrap();

        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/var/lib/qc")));
        assert_eq!(config.storage.existing, WithExisting::Verify);
        assert_eq!(config.genesis.sealer, SealerKind::BasicAuthority);
        assert_eq!(config.genesis.extra_data, Some(vec![0xca, 0xfe]));
        assert_eq!(config.genesis.difficulty, Some(U256::from(131_072)));
        assert_eq!(config.genesis.gas_limit, Some(U256::from(3_141_592)));
        assert_eq!(
            config.genesis.state_file,
            Some(PathBuf::from("/etc/qc/genesis.json"))
        );
    }

    #[test]
    fn test_in_memory_data_dir() {
        let config = NodeConfig::from_lookup(lookup(&[("QC_DATA_DIR", IN_MEMORY)])).unwrap();
        assert_eq!(config.storage.data_dir, None);
    }

    #[test]
    fn test_invalid_values() {
        for (var, value) in [
            ("QC_WITH_EXISTING", "sometimes"),
            ("QC_SEALER", "clique"),
            ("QC_GENESIS_EXTRA_DATA", "xyz"),
            ("QC_GENESIS_DIFFICULTY", "lots"),
            ("QC_GENESIS_GAS_LIMIT", "-5"),
        ] {
            match NodeConfig::from_lookup(lookup(&[(var, value)])) {
                Err(ConfigError::InvalidValue { var: reported, .. }) => assert_eq!(reported, var),
                other => panic!("{}={} gave {:?}", var, value, other),
            }
        }
    }

    #[test]
    fn test_apply_to_registry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "0x00000000000000000000000000000000000000aa": {{ "balance": "9" }} }}"#
        )
        .unwrap();

        let settings = GenesisSettings {
            extra_data: Some(b"cfg".to_vec()),
            gas_limit: Some(U256::from(10_000)),
            state_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let registry = GenesisRegistry::new();
        settings.apply_to(&registry).unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.extra_data, b"cfg".to_vec());
        assert_eq!(snapshot.gas_limit, Some(U256::from(10_000)));
        assert!(snapshot.difficulty.is_none());
        assert!(snapshot
            .state_description
            .unwrap()
            .contains("00000000000000000000000000000000000000aa"));
    }

    #[test]
    fn test_apply_reports_missing_state_file() {
        let settings = GenesisSettings {
            state_file: Some(PathBuf::from("/nonexistent/qc-genesis.json")),
            ..Default::default()
        };
        assert!(matches!(
            settings.apply_to(&GenesisRegistry::new()),
            Err(ConfigError::StateFile { .. })
        ));
    }

    #[test]
    fn test_apply_rejects_out_of_range_override() {
        let settings = GenesisSettings {
            difficulty: Some(U256::zero()),
            ..Default::default()
        };
        assert!(matches!(
            settings.apply_to(&GenesisRegistry::new()),
            Err(ConfigError::Genesis(GenesisError::InvalidOverride(_)))
        ));
    }
}
