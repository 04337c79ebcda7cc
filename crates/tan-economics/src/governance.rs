// crates/tan-economics/src/governance.rs
//
// Owner gate and delayed-ownership wrapper.
//
// `Ownable` is the capability check every administrative transition runs
// before touching state. `CraftsmanAdmin` is a separate two-phase state
// machine that, once it owns a Craftsman, forwards the owner calls and only
// hands the Craftsman to a new owner after TRANSFER_OWNERSHIP_TIMELOCK_SECS.

use serde::{Deserialize, Serialize};
use tan_core::address::Address;
use tan_core::call::CallContext;
use tan_core::error::FarmError;
use tracing::info;

use crate::craftsman::Craftsman;

/// Delay between enabling and finalizing an ownership transfer: 2 days.
pub const TRANSFER_OWNERSHIP_TIMELOCK_SECS: i64 = 2 * 24 * 60 * 60;

/// Single-owner capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// # Errors
    /// Returns `FarmError::NotAuthorized` unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Address, action: &str) -> Result<(), FarmError> {
        if *caller != self.owner {
            return Err(FarmError::NotAuthorized(format!(
                "{}: caller {} is not the owner {}",
                action, caller, self.owner
            )));
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`, returning the previous owner.
    pub fn transfer(&mut self, caller: &Address, new_owner: Address) -> Result<Address, FarmError> {
        self.ensure_owner(caller, "transfer_ownership")?;
        if new_owner.is_zero() {
            return Err(FarmError::InvalidParameter(
                "New owner is the zero address".to_string(),
            ));
        }
        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }
}

/// An owner-gated Craftsman call, as data.
///
/// This is what the Timelock queues and hashes, and what `CraftsmanAdmin`
/// forwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminAction {
    AddPool { weight: u64, asset: Address },
    SetPoolWeight { pid: usize, weight: u64 },
    UpdateStakingRatio { ratio_percent: u8 },
    UpdateMultiplier { multiplier: u64 },
    SetDevAddress { dev: Address },
    AdvanceEpoch,
    TransferOwnership { new_owner: Address },
}

impl AdminAction {
    /// Run the call against `farm` under `call`'s identity.
    pub fn apply_to(&self, farm: &mut Craftsman, call: &CallContext) -> Result<(), FarmError> {
        match self {
            AdminAction::AddPool { weight, asset } => {
                farm.add_pool(call, *weight, *asset)?;
            }
            AdminAction::SetPoolWeight { pid, weight } => farm.set_pool_weight(call, *pid, *weight)?,
            AdminAction::UpdateStakingRatio { ratio_percent } => {
                farm.update_staking_ratio(call, *ratio_percent)?
            }
            AdminAction::UpdateMultiplier { multiplier } => {
                farm.update_multiplier(call, *multiplier)?
            }
            AdminAction::SetDevAddress { dev } => farm.set_dev_address(call, *dev)?,
            AdminAction::AdvanceEpoch => {
                farm.advance_epoch(call)?;
            }
            AdminAction::TransferOwnership { new_owner } => {
                farm.transfer_ownership(call, *new_owner)?
            }
        }
        Ok(())
    }
}

/// Ownership candidate and the earliest time it can take over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransfer {
    pub new_owner: Address,
    pub eta: i64,
}

/// Delayed-ownership wrapper around a Craftsman.
///
/// The wrapper's own `address` must be the Craftsman's owner. Administrative
/// calls pass through after the wrapper's owner check; ownership of the
/// Craftsman moves only via `enable_transfer_ownership` followed, no earlier
/// than the delay, by `transfer_ownership`.
#[derive(Debug, Clone)]
pub struct CraftsmanAdmin {
    address: Address,
    owner: Ownable,
    delay_secs: i64,
    pending: Option<PendingTransfer>,
}

impl CraftsmanAdmin {
    pub fn new(address: Address, owner: Address) -> Self {
        Self::with_delay(address, owner, TRANSFER_OWNERSHIP_TIMELOCK_SECS)
    }

    pub fn with_delay(address: Address, owner: Address, delay_secs: i64) -> Self {
        Self {
            address,
            owner: Ownable::new(owner),
            delay_secs,
            pending: None,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner.owner()
    }

    pub fn pending_transfer(&self) -> Option<PendingTransfer> {
        self.pending
    }

    /// Forward an administrative action after checking the wrapper's owner.
    ///
    /// Ownership transfer is not forwardable; it must go through the delay.
    pub fn forward(
        &self,
        call: &CallContext,
        farm: &mut Craftsman,
        action: &AdminAction,
    ) -> Result<(), FarmError> {
        self.owner.ensure_owner(&call.sender, "forward")?;
        if matches!(action, AdminAction::TransferOwnership { .. }) {
            return Err(FarmError::InvalidParameter(
                "Ownership transfer must use enable_transfer_ownership".to_string(),
            ));
        }
        action.apply_to(farm, &call.with_sender(self.address))
    }

    pub fn add_pool(
        &self,
        call: &CallContext,
        farm: &mut Craftsman,
        weight: u64,
        asset: Address,
    ) -> Result<(), FarmError> {
        self.forward(call, farm, &AdminAction::AddPool { weight, asset })
    }

    pub fn set_pool_weight(
        &self,
        call: &CallContext,
        farm: &mut Craftsman,
        pid: usize,
        weight: u64,
    ) -> Result<(), FarmError> {
        self.forward(call, farm, &AdminAction::SetPoolWeight { pid, weight })
    }

    pub fn update_staking_ratio(
        &self,
        call: &CallContext,
        farm: &mut Craftsman,
        ratio_percent: u8,
    ) -> Result<(), FarmError> {
        self.forward(call, farm, &AdminAction::UpdateStakingRatio { ratio_percent })
    }

    pub fn update_multiplier(
        &self,
        call: &CallContext,
        farm: &mut Craftsman,
        multiplier: u64,
    ) -> Result<(), FarmError> {
        self.forward(call, farm, &AdminAction::UpdateMultiplier { multiplier })
    }

    pub fn set_dev_address(
        &self,
        call: &CallContext,
        farm: &mut Craftsman,
        dev: Address,
    ) -> Result<(), FarmError> {
        self.forward(call, farm, &AdminAction::SetDevAddress { dev })
    }

    pub fn advance_epoch(&self, call: &CallContext, farm: &mut Craftsman) -> Result<(), FarmError> {
        self.forward(call, farm, &AdminAction::AdvanceEpoch)
    }

    /// Propose `new_owner`. Calling again replaces the candidate and restarts
    /// the delay.
    pub fn enable_transfer_ownership(
        &mut self,
        call: &CallContext,
        new_owner: Address,
    ) -> Result<PendingTransfer, FarmError> {
        self.owner
            .ensure_owner(&call.sender, "enable_transfer_ownership")?;
        if new_owner.is_zero() {
            return Err(FarmError::InvalidParameter(
                "New owner is the zero address".to_string(),
            ));
        }
        let pending = PendingTransfer {
            new_owner,
            eta: call.timestamp.saturating_add(self.delay_secs),
        };
        self.pending = Some(pending);
        info!(
            new_owner = %new_owner,
            eta = pending.eta,
            "Craftsman ownership transfer enabled"
        );
        Ok(pending)
    }

    /// Finalize the pending transfer once its eta has passed.
    pub fn transfer_ownership(
        &mut self,
        call: &CallContext,
        farm: &mut Craftsman,
    ) -> Result<Address, FarmError> {
        self.owner.ensure_owner(&call.sender, "transfer_ownership")?;
        let pending = self.pending.ok_or_else(|| {
            FarmError::NotFound("No ownership transfer has been enabled".to_string())
        })?;
        if call.timestamp < pending.eta {
            return Err(FarmError::NotReady(format!(
                "Ownership transfer unlocks at {}, now is {}",
                pending.eta, call.timestamp
            )));
        }
        farm.transfer_ownership(&call.with_sender(self.address), pending.new_owner)?;
        self.pending = None;
        Ok(pending.new_owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownable_gate() {
        let alice = Address::derive("alice");
        let bob = Address::derive("bob");
        let mut gate = Ownable::new(alice);
        assert!(gate.ensure_owner(&alice, "x").is_ok());
        assert!(matches!(
            gate.ensure_owner(&bob, "x"),
            Err(FarmError::NotAuthorized(_))
        ));

        assert!(gate.transfer(&bob, bob).is_err());
        assert!(gate.transfer(&alice, Address::ZERO).is_err());
        assert_eq!(gate.transfer(&alice, bob).unwrap(), alice);
        assert_eq!(gate.owner(), bob);
    }

    #[test]
    fn test_admin_action_json_shape() {
        let action = AdminAction::SetPoolWeight { pid: 2, weight: 500 };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "set_pool_weight");
        assert_eq!(json["pid"], 2);
        let back: AdminAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);

        let epoch = serde_json::to_string(&AdminAction::AdvanceEpoch).unwrap();
        assert_eq!(epoch, r#"{"action":"advance_epoch"}"#);
    }

    #[test]
    fn test_enable_transfer_resets_timer() {
        let owner = Address::derive("owner");
        let mut admin = CraftsmanAdmin::new(Address::derive("admin"), owner);
        let call = CallContext::new(owner, 1, 1_000);

        let first = admin
            .enable_transfer_ownership(&call, Address::derive("a"))
            .unwrap();
        assert_eq!(first.eta, 1_000 + TRANSFER_OWNERSHIP_TIMELOCK_SECS);

        let second = admin
            .enable_transfer_ownership(&call.at_time(5_000), Address::derive("b"))
            .unwrap();
        assert_eq!(second.eta, 5_000 + TRANSFER_OWNERSHIP_TIMELOCK_SECS);
        assert_eq!(admin.pending_transfer().unwrap().new_owner, Address::derive("b"));
    }

    #[test]
    fn test_enable_transfer_requires_owner() {
        let mut admin = CraftsmanAdmin::new(Address::derive("admin"), Address::derive("owner"));
        let call = CallContext::new(Address::derive("mallory"), 1, 0);
        assert!(matches!(
            admin.enable_transfer_ownership(&call, Address::derive("mallory")),
            Err(FarmError::NotAuthorized(_))
        ));
        assert!(admin.pending_transfer().is_none());
    }
}
