//! # Genesis Overrides
//!
//! Operator-supplied replacements for default genesis fields, held by a
//! `GenesisRegistry` that the node constructs once at startup and shares by
//! `Arc`.
//!
//! ## Ordering
//!
//! Overrides only affect a memoized genesis if they are set before it is
//! first computed. Setting one afterwards is accepted and recorded, but the
//! memoized genesis keeps its value until the chain is reopened.
//! `is_finalized()` reports whether that point has been passed.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use primitive_types::U256;
use tracing::{debug, warn};

use super::builder::GenesisError;
use super::profile::{MAX_EXTRA_DATA_SIZE, MAX_STATE_DESCRIPTION_SIZE, MIN_GAS_LIMIT};

/// Snapshot of every override. Unset fields fall back to the profile
/// default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenesisOverrides {
    /// Empty means "use the default".
    pub extra_data: Vec<u8>,
    pub difficulty: Option<U256>,
    pub gas_limit: Option<U256>,
    /// Raw JSON state description, parsed when the genesis is built.
    pub state_description: Option<String>,
}

impl GenesisOverrides {
    /// True iff a header field (extra data, difficulty or gas limit) is
    /// overridden. A state override alone does not count.
    pub fn is_non_standard(&self) -> bool {
        !self.extra_data.is_empty() || self.difficulty.is_some() || self.gas_limit.is_some()
    }

    pub fn validate(&self) -> Result<(), GenesisError> {
        check_extra_data(&self.extra_data)?;
        if let Some(difficulty) = self.difficulty {
            check_difficulty(difficulty)?;
        }
        if let Some(gas_limit) = self.gas_limit {
            check_gas_limit(gas_limit)?;
        }
        if let Some(description) = &self.state_description {
            check_state_description(description)?;
        }
        Ok(())
    }
}

fn check_extra_data(bytes: &[u8]) -> Result<(), GenesisError> {
    if bytes.len() > MAX_EXTRA_DATA_SIZE {
        return Err(GenesisError::InvalidOverride(format!(
            "extra data is {} bytes, at most {} allowed",
            bytes.len(),
            MAX_EXTRA_DATA_SIZE
        )));
    }
    Ok(())
}

fn check_difficulty(value: U256) -> Result<(), GenesisError> {
    if value.is_zero() {
        return Err(GenesisError::InvalidOverride(
            "difficulty must be non-zero".to_string(),
        ));
    }
    Ok(())
}

fn check_gas_limit(value: U256) -> Result<(), GenesisError> {
    if value < U256::from(MIN_GAS_LIMIT) {
        return Err(GenesisError::InvalidOverride(format!(
            "gas limit {} is below the minimum of {}",
            value, MIN_GAS_LIMIT
        )));
    }
    Ok(())
}

fn check_state_description(description: &str) -> Result<(), GenesisError> {
    if description.len() > MAX_STATE_DESCRIPTION_SIZE {
        return Err(GenesisError::InvalidOverride(format!(
            "state description is {} bytes, at most {} allowed",
            description.len(),
            MAX_STATE_DESCRIPTION_SIZE
        )));
    }
    Ok(())
}

/// Process-wide holder of genesis overrides.
#[derive(Debug, Default)]
pub struct GenesisRegistry {
    overrides: RwLock<GenesisOverrides>,
    finalized: AtomicBool,
}

impl GenesisRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the genesis allocation with a JSON state description.
    ///
    /// Only the size is checked here; the description is parsed when the
    /// genesis is built, and a malformed one fails that build.
    pub fn set_state_override(&self, description: impl Into<String>) -> Result<(), GenesisError> {
        let description = description.into();
        check_state_description(&description)?;
        self.warn_if_finalized("state");
        debug!(bytes = description.len(), "Genesis state override set");
        self.overrides.write().state_description = Some(description);
        Ok(())
    }

    /// Override the header's extra data. An empty value restores the
    /// default.
    pub fn force_extra_data(&self, bytes: impl Into<Vec<u8>>) -> Result<(), GenesisError> {
        let bytes = bytes.into();
        check_extra_data(&bytes)?;
        self.warn_if_finalized("extra data");
        debug!(extra_data = %hex::encode(&bytes), "Genesis extra data forced");
        self.overrides.write().extra_data = bytes;
        Ok(())
    }

    pub fn force_difficulty(&self, value: U256) -> Result<(), GenesisError> {
        check_difficulty(value)?;
        self.warn_if_finalized("difficulty");
        debug!(difficulty = %value, "Genesis difficulty forced");
        self.overrides.write().difficulty = Some(value);
        Ok(())
    }

    pub fn force_gas_limit(&self, value: U256) -> Result<(), GenesisError> {
        check_gas_limit(value)?;
        self.warn_if_finalized("gas limit");
        debug!(gas_limit = %value, "Genesis gas limit forced");
        self.overrides.write().gas_limit = Some(value);
        Ok(())
    }

    /// See [`GenesisOverrides::is_non_standard`].
    pub fn is_non_standard(&self) -> bool {
        self.overrides.read().is_non_standard()
    }

    pub fn snapshot(&self) -> GenesisOverrides {
        self.overrides.read().clone()
    }

    /// True while a memoizing provider holds a genesis computed from this
    /// registry. Overrides set in that window do not reach the memoized
    /// genesis until the chain is reopened.
    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    pub(crate) fn mark_finalized(&self) {
        self.finalized.store(true, Ordering::Release);
    }

    pub(crate) fn clear_finalized(&self) {
        self.finalized.store(false, Ordering::Release);
    }

    fn warn_if_finalized(&self, field: &str) {
        if self.is_finalized() {
            warn!(
                field,
                "Genesis {} override set after the genesis was computed; \
                 it takes effect only after the chain is reopened",
                field
            );
        }
    }
}
