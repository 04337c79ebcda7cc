// crates/tan-core/src/address.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::hash_bytes;
use crate::error::FarmError;

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Identity of an account on the farm: users, the engine itself, the
/// receipt vault, deposit-asset ledgers, and governance wrappers.
///
/// Rendered as `0x`-prefixed lowercase hex. The all-zero address is reserved
/// and never accepted as a role holder.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The reserved zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Wrap raw address bytes.
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Deterministically derive an address from a human-readable label.
    ///
    /// The address is the trailing 20 bytes of `SHA-256("tan:address:" || label)`,
    /// so the same label always maps to the same account.
    pub fn derive(label: &str) -> Self {
        let digest = hash_bytes(format!("tan:address:{}", label).as_bytes());
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[32 - ADDRESS_LEN..]);
        Self(bytes)
    }

    /// Parse `0x`-prefixed hex, or derive from the label otherwise.
    pub fn resolve(text: &str) -> Result<Self, FarmError> {
        if text.starts_with("0x") {
            text.parse()
        } else {
            Ok(Self::derive(text))
        }
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| FarmError::InvalidParameter(format!("Invalid address {}: {}", s, e)))?;
        let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            FarmError::InvalidParameter(format!(
                "Address {} must be exactly {} bytes",
                s, ADDRESS_LEN
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::resolve(&text).map_err(serde::de::Error::custom)
    }
}
