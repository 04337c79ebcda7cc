// crates/tan-core/src/error.rs

use thiserror::Error;

/// Protocol-wide error types for the TAN farm.
///
/// Every fallible operation is all-or-nothing: when one of these is returned,
/// the component that produced it is left exactly as it was before the call.
/// Nothing inside the workspace retries; callers resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FarmError {
    /// The caller lacks the role required for the call (owner, minter, admin).
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// A calendar gate (emission epoch, ownership delay, timelock eta) has not
    /// elapsed yet. Recoverable by waiting.
    #[error("Not ready: {0}")]
    NotReady(String),

    /// A withdrawal, transfer, or burn exceeds the holder's balance.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    /// A delegated transfer exceeds the approved allowance.
    #[error("Insufficient allowance: requested {requested}, approved {approved}")]
    InsufficientAllowance { requested: u128, approved: u128 },

    /// A parameter is outside its accepted range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No pool exists with the given id.
    #[error("Unknown pool: {0}")]
    UnknownPool(usize),

    /// Resource not found (unregistered asset, unqueued transaction).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Checked arithmetic overflowed.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Configuration could not be read or is inconsistent.
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FarmError {
    fn from(e: serde_json::Error) -> Self {
        FarmError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for FarmError {
    fn from(e: toml::de::Error) -> Self {
        FarmError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_insufficient_balance() {
        let err = FarmError::InsufficientBalance {
            requested: 10,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: requested 10, available 3"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let err: FarmError = parse.unwrap_err().into();
        assert!(matches!(err, FarmError::Serialization(_)));
    }

    #[test]
    fn test_from_toml_error() {
        let parse: Result<std::collections::BTreeMap<String, u32>, _> = toml::from_str("x = ");
        let err: FarmError = parse.unwrap_err().into();
        assert!(matches!(err, FarmError::Config(_)));
    }
}
