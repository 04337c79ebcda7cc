// crates/tan-economics/src/timelock.rs
//
// Generic timelocked executor for Craftsman administration.
//
// The admin queues an `AdminAction` with an execution time `eta` at least
// `delay` in the future. The transaction is identified by
//   SHA-256(canonical JSON of (action, eta))
// and can be executed once, inside `[eta, eta + GRACE_PERIOD_SECS]`, with the
// timelock's own address as the caller. The Craftsman must be owned by the
// timelock for executed actions to pass its owner gate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tan_core::address::Address;
use tan_core::call::CallContext;
use tan_core::crypto::hash_json;
use tan_core::error::FarmError;
use tracing::info;

use crate::craftsman::Craftsman;
use crate::governance::AdminAction;

/// Window after `eta` during which a queued transaction stays executable.
pub const GRACE_PERIOD_SECS: i64 = 14 * 24 * 60 * 60;

/// Shortest accepted delay: 6 hours.
pub const MINIMUM_DELAY_SECS: i64 = 6 * 60 * 60;

/// Longest accepted delay: 30 days.
pub const MAXIMUM_DELAY_SECS: i64 = 30 * 24 * 60 * 60;

pub type TxHash = [u8; 32];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTransaction {
    pub action: AdminAction,
    pub eta: i64,
}

/// Identifier of `(action, eta)`.
pub fn transaction_hash(action: &AdminAction, eta: i64) -> Result<TxHash, FarmError> {
    hash_json(&(action, eta))
}

#[derive(Debug, Clone)]
pub struct Timelock {
    address: Address,
    admin: Address,
    pending_admin: Option<Address>,
    delay_secs: i64,
    queued: BTreeMap<TxHash, QueuedTransaction>,
}

impl Timelock {
    pub fn new(address: Address, admin: Address, delay_secs: i64) -> Result<Self, FarmError> {
        check_delay(delay_secs)?;
        Ok(Self {
            address,
            admin,
            pending_admin: None,
            delay_secs,
            queued: BTreeMap::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn pending_admin(&self) -> Option<Address> {
        self.pending_admin
    }

    pub fn delay_secs(&self) -> i64 {
        self.delay_secs
    }

    pub fn is_queued(&self, hash: &TxHash) -> bool {
        self.queued.contains_key(hash)
    }

    pub fn queued(&self) -> impl Iterator<Item = (&TxHash, &QueuedTransaction)> {
        self.queued.iter()
    }

    pub fn set_delay(&mut self, call: &CallContext, delay_secs: i64) -> Result<(), FarmError> {
        self.ensure_admin(call, "set_delay")?;
        check_delay(delay_secs)?;
        self.delay_secs = delay_secs;
        info!(delay_secs, "Timelock delay updated");
        Ok(())
    }

    pub fn set_pending_admin(&mut self, call: &CallContext, pending: Address) -> Result<(), FarmError> {
        self.ensure_admin(call, "set_pending_admin")?;
        self.pending_admin = Some(pending);
        info!(pending_admin = %pending, "Timelock pending admin set");
        Ok(())
    }

    pub fn accept_admin(&mut self, call: &CallContext) -> Result<(), FarmError> {
        if self.pending_admin != Some(call.sender) {
            return Err(FarmError::NotAuthorized(format!(
                "accept_admin: {} is not the pending admin",
                call.sender
            )));
        }
        self.admin = call.sender;
        self.pending_admin = None;
        info!(admin = %self.admin, "Timelock admin accepted");
        Ok(())
    }

    /// Queue `action` for execution at `eta`. Returns the transaction hash.
    pub fn queue_transaction(
        &mut self,
        call: &CallContext,
        action: AdminAction,
        eta: i64,
    ) -> Result<TxHash, FarmError> {
        self.ensure_admin(call, "queue_transaction")?;
        let earliest = call.timestamp.saturating_add(self.delay_secs);
        if eta < earliest {
            return Err(FarmError::InvalidParameter(format!(
                "Eta {} must be at least {} (now + delay)",
                eta, earliest
            )));
        }
        let hash = transaction_hash(&action, eta)?;
        info!(tx = %hex::encode(hash), eta, "Transaction queued");
        self.queued.insert(hash, QueuedTransaction { action, eta });
        Ok(hash)
    }

    pub fn cancel_transaction(
        &mut self,
        call: &CallContext,
        action: &AdminAction,
        eta: i64,
    ) -> Result<TxHash, FarmError> {
        self.ensure_admin(call, "cancel_transaction")?;
        let hash = transaction_hash(action, eta)?;
        if self.queued.remove(&hash).is_none() {
            return Err(FarmError::NotFound(format!(
                "Transaction {} is not queued",
                hex::encode(hash)
            )));
        }
        info!(tx = %hex::encode(hash), "Transaction cancelled");
        Ok(hash)
    }

    /// Execute a queued transaction against `farm` with the timelock as
    /// caller. The hash is only consumed if the action succeeds.
    pub fn execute_transaction(
        &mut self,
        call: &CallContext,
        farm: &mut Craftsman,
        action: &AdminAction,
        eta: i64,
    ) -> Result<TxHash, FarmError> {
        self.ensure_admin(call, "execute_transaction")?;
        let hash = transaction_hash(action, eta)?;
        if !self.queued.contains_key(&hash) {
            return Err(FarmError::NotFound(format!(
                "Transaction {} is not queued",
                hex::encode(hash)
            )));
        }
        if call.timestamp < eta {
            return Err(FarmError::NotReady(format!(
                "Transaction unlocks at {}, now is {}",
                eta, call.timestamp
            )));
        }
        if call.timestamp > eta.saturating_add(GRACE_PERIOD_SECS) {
            return Err(FarmError::InvalidParameter(format!(
                "Transaction expired at {}",
                eta.saturating_add(GRACE_PERIOD_SECS)
            )));
        }

        action.apply_to(farm, &call.with_sender(self.address))?;
        self.queued.remove(&hash);
        info!(tx = %hex::encode(hash), "Transaction executed");
        Ok(hash)
    }

    fn ensure_admin(&self, call: &CallContext, action: &str) -> Result<(), FarmError> {
        if call.sender != self.admin {
            return Err(FarmError::NotAuthorized(format!(
                "{}: caller {} is not the timelock admin",
                action, call.sender
            )));
        }
        Ok(())
    }
}

fn check_delay(delay_secs: i64) -> Result<(), FarmError> {
    if !(MINIMUM_DELAY_SECS..=MAXIMUM_DELAY_SECS).contains(&delay_secs) {
        return Err(FarmError::InvalidParameter(format!(
            "Delay {}s must be within {}..={}",
            delay_secs, MINIMUM_DELAY_SECS, MAXIMUM_DELAY_SECS
        )));
    }
    Ok(())
}
