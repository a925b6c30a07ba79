//! # State Descriptions
//!
//! Parses an operator-supplied genesis allocation.
//!
//! ```json
//! {
//!   "0x00000000000000000000000000000000000000aa": { "balance": "1000000" },
//!   "00000000000000000000000000000000000000bb": {
//!     "wei": "0xde0b6b3a7640000",
//!     "nonce": 1,
//!     "code": "0x6000",
//!     "storage": { "0x01": "0x2a" }
//!   }
//! }
//! ```
//!
//! Quantities are JSON numbers, decimal strings or `0x` hex strings.
//! Unknown fields are rejected rather than ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use primitive_types::{H160, H256, U256};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use shared_types::{AccountMap, AccountState};

use super::builder::GenesisError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Quantity {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AccountSpec {
    #[serde(default)]
    balance: Option<Quantity>,
    #[serde(default)]
    wei: Option<Quantity>,
    #[serde(default)]
    nonce: Option<Quantity>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    storage: BTreeMap<String, Quantity>,
}

/// Top-level description entries in document order. A key that appears
/// twice is an error instead of overwriting the earlier entry.
struct AccountSpecs(Vec<(String, AccountSpec)>);

impl<'de> Deserialize<'de> for AccountSpecs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpecsVisitor;

        impl<'de> Visitor<'de> for SpecsVisitor {
            type Value = AccountSpecs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from address to account")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut seen = BTreeSet::new();
                let mut entries = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    if !seen.insert(key.clone()) {
                        return Err(de::Error::custom(format!(
                            "address {} listed more than once",
                            key
                        )));
                    }
                    entries.push((key, map.next_value::<AccountSpec>()?));
                }
                Ok(AccountSpecs(entries))
            }
        }

        deserializer.deserialize_map(SpecsVisitor)
    }
}

fn invalid(reason: impl Into<String>) -> GenesisError {
    GenesisError::InvalidStateDescription(reason.into())
}

/// Parse a JSON state description into an allocation.
///
/// # Errors
///
/// `InvalidStateDescription` for malformed JSON, unknown fields, bad
/// addresses or quantities, or an address listed twice.
pub fn parse_state_description(json: &str) -> Result<AccountMap, GenesisError> {
    let AccountSpecs(specs) = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;

    let mut accounts = AccountMap::new();
    for (key, spec) in specs {
        let address = parse_address(&key)?;
        let account = spec.into_account(&key)?;
        if accounts.insert(address, account).is_some() {
            return Err(invalid(format!("address {} listed more than once", key)));
        }
    }
    Ok(accounts)
}

impl AccountSpec {
    fn into_account(self, key: &str) -> Result<AccountState, GenesisError> {
        let balance = match (self.balance, self.wei) {
            (Some(_), Some(_)) => {
                return Err(invalid(format!(
                    "{}: both 'balance' and 'wei' given",
                    key
                )))
            }
            (Some(q), None) | (None, Some(q)) => parse_quantity(&q)?,
            (None, None) => U256::zero(),
        };

        let mut account = AccountState::new(balance);
        if let Some(nonce) = self.nonce {
            account.nonce = parse_quantity(&nonce)?;
        }
        if let Some(code) = self.code {
            account.code = parse_hex(&code).map_err(|e| invalid(format!("{}: code: {}", key, e)))?;
        }
        for (slot, value) in self.storage {
            let slot = parse_quantity(&Quantity::Text(slot))?;
            let value = parse_quantity(&value)?;
            account.storage.insert(to_h256(slot), to_h256(value));
        }
        Ok(account)
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn parse_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(strip_hex_prefix(s))
}

fn parse_address(s: &str) -> Result<H160, GenesisError> {
    let raw = strip_hex_prefix(s);
    if raw.len() != 40 {
        return Err(invalid(format!(
            "address '{}' must be 40 hex digits",
            s
        )));
    }
    let bytes = hex::decode(raw).map_err(|e| invalid(format!("address '{}': {}", s, e)))?;
    Ok(H160::from_slice(&bytes))
}

/// Decimal or `0x` hex quantity.
pub(crate) fn parse_u256(s: &str) -> Result<U256, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() {
            return Ok(U256::zero());
        }
        U256::from_str_radix(hex, 16).map_err(|e| format!("'{}': {:?}", s, e))
    } else {
        U256::from_dec_str(s).map_err(|e| format!("'{}': {:?}", s, e))
    }
}

fn parse_quantity(q: &Quantity) -> Result<U256, GenesisError> {
    match q {
        Quantity::Number(n) => Ok(U256::from(*n)),
        Quantity::Text(s) => parse_u256(s).map_err(invalid),
    }
}

fn to_h256(value: U256) -> H256 {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    H256(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balances_in_every_notation() {
        let accounts = parse_state_description(
            r#"{
                "0x00000000000000000000000000000000000000aa": { "balance": "1000" },
                "00000000000000000000000000000000000000bb": { "wei": "0x10" },
                "00000000000000000000000000000000000000cc": { "balance": 7 }
            }"#,
        )
        .unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[&H160::from_low_u64_be(0xaa)].balance, U256::from(1000));
        assert_eq!(accounts[&H160::from_low_u64_be(0xbb)].balance, U256::from(16));
        assert_eq!(accounts[&H160::from_low_u64_be(0xcc)].balance, U256::from(7));
    }

    #[test]
    fn test_parse_contract_account() {
        let accounts = parse_state_description(
            r#"{
                "0x00000000000000000000000000000000000000aa": {
                    "nonce": "0x2",
                    "code": "0x6000",
                    "storage": { "0x01": "42" }
                }
            }"#,
        )
        .unwrap();

        let account = &accounts[&H160::from_low_u64_be(0xaa)];
        assert!(account.balance.is_zero());
        assert_eq!(account.nonce, U256::from(2));
        assert_eq!(account.code, vec![0x60, 0x00]);
        assert_eq!(
            account.storage.get(&H256::from_low_u64_be(1)),
            Some(&H256::from_low_u64_be(42))
        );
    }

    #[test]
    fn test_large_balance() {
        let accounts = parse_state_description(
            r#"{ "0x00000000000000000000000000000000000000aa":
                 { "wei": "1606938044258990275541962092341162602522202993782792835301376" } }"#,
        )
        .unwrap();
        assert_eq!(
            accounts[&H160::from_low_u64_be(0xaa)].balance,
            U256::one() << 200
        );
    }

    #[test]
    fn test_empty_description() {
        assert!(parse_state_description("{}").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_descriptions_are_rejected() {
        let cases = [
            "not json",
            "[]",
            r#"{ "0xaa": { "balance": "1" } }"#,
            r#"{ "0x00000000000000000000000000000000000000zz": { "balance": "1" } }"#,
            r#"{ "0x00000000000000000000000000000000000000aa": { "balance": "ten" } }"#,
            r#"{ "0x00000000000000000000000000000000000000aa": { "balance": "1", "wei": "1" } }"#,
            r#"{ "0x00000000000000000000000000000000000000aa": { "code": "0xzz" } }"#,
            r#"{ "0x00000000000000000000000000000000000000aa": { "colour": "red" } }"#,
        ];
        for case in cases {
            assert!(
                matches!(
                    parse_state_description(case),
                    Err(GenesisError::InvalidStateDescription(_))
                ),
                "accepted: {}",
                case
            );
        }
    }

    #[test]
    fn test_duplicate_address_is_rejected() {
        let cases = [
            r#"{
                "0x00000000000000000000000000000000000000aa": { "balance": "1" },
                "00000000000000000000000000000000000000aa": { "balance": "2" }
            }"#,
            r#"{
                "0x00000000000000000000000000000000000000aa": { "balance": "1" },
                "0x00000000000000000000000000000000000000aa": { "balance": "2" }
            }"#,
            r#"{
                "0x00000000000000000000000000000000000000AA": { "balance": "1" },
                "0x00000000000000000000000000000000000000aa": { "balance": "2" }
            }"#,
        ];
        for json in cases {
            match parse_state_description(json) {
                Err(GenesisError::InvalidStateDescription(reason)) => {
                    assert!(reason.contains("more than once"), "{}", reason)
                }
                other => panic!("accepted duplicate: {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_u256() {
        assert_eq!(parse_u256("0x20000").unwrap(), U256::from(131_072));
        assert_eq!(parse_u256("131072").unwrap(), U256::from(131_072));
        assert_eq!(parse_u256("0x").unwrap(), U256::zero());
        assert!(parse_u256("-1").is_err());
        assert!(parse_u256("0xgg").is_err());
    }
}
