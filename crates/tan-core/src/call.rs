// crates/tan-core/src/call.rs

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// The environment a state transition executes under.
///
/// `sender` is trusted as already authenticated by the execution substrate;
/// role checks compare it against the stored role holders. Block height
/// drives reward accrual, the timestamp drives calendar gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub sender: Address,
    pub block: u64,
    /// Unix seconds.
    pub timestamp: i64,
}

impl CallContext {
    pub fn new(sender: Address, block: u64, timestamp: i64) -> Self {
        Self {
            sender,
            block,
            timestamp,
        }
    }

    /// Same block and time, different caller. Used when a governance wrapper
    /// forwards a call under its own identity.
    pub fn with_sender(&self, sender: Address) -> Self {
        Self { sender, ..*self }
    }

    pub fn at_block(&self, block: u64) -> Self {
        Self { block, ..*self }
    }

    pub fn at_time(&self, timestamp: i64) -> Self {
        Self { timestamp, ..*self }
    }
}
