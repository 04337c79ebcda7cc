// crates/tan-economics/src/workbench.rs
//
// The Workbench: 1:1 receipt for TAN staked in pool 0, and the vault that
// custodies freshly minted rewards until they are harvested.
//
// Receipts are not transferable; they only move through the owner's
// mint/burn calls, so a holder's receipt balance always equals their pool 0
// principal. Rewards are minted into the TAN balance of the Workbench's own
// address and paid out with a capped transfer that tolerates rounding dust.

use tan_core::address::Address;
use tan_core::error::FarmError;
use tan_core::traits::{FungibleLedger, StakingReceipt};
use tracing::debug;

use crate::governance::Ownable;
use crate::ledger::Ledger;

/// Receipt symbol.
pub const BENCH_SYMBOL: &str = "BENCH";

#[derive(Debug, Clone)]
pub struct Workbench {
    owner: Ownable,
    receipts: Ledger,
}

impl Workbench {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            owner: Ownable::new(owner),
            receipts: Ledger::new(address, BENCH_SYMBOL),
        }
    }

    /// Address of the Workbench. Also the reward vault account in the TAN
    /// ledger.
    pub fn address(&self) -> Address {
        self.receipts.address()
    }

    pub fn owner(&self) -> Address {
        self.owner.owner()
    }

    pub fn receipt_supply(&self) -> u128 {
        self.receipts.total_supply()
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), FarmError> {
        self.owner.transfer(caller, new_owner).map(|_| ())
    }

    /// Vault balance available for reward payouts.
    pub fn vault_balance(&self, token: &impl FungibleLedger) -> u128 {
        token.balance_of(&self.address())
    }

    /// Pay `min(amount, vault balance)` of `token` to `to`. Owner only.
    pub fn safe_reward_transfer(
        &self,
        caller: &Address,
        token: &mut impl FungibleLedger,
        to: &Address,
        amount: u128,
    ) -> Result<u128, FarmError> {
        self.owner.ensure_owner(caller, "safe_reward_transfer")?;
        let paid = token.safe_transfer(&self.address(), to, amount)?;
        if paid < amount {
            debug!(requested = amount, paid, to = %to, "Reward payout capped by vault balance");
        }
        Ok(paid)
    }
}

impl StakingReceipt for Workbench {
    fn mint_receipt(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<(), FarmError> {
        self.owner.ensure_owner(caller, "mint_receipt")?;
        self.receipts.issue(to, amount)
    }

    fn burn_receipt(
        &mut self,
        caller: &Address,
        from: &Address,
        amount: u128,
    ) -> Result<(), FarmError> {
        self.owner.ensure_owner(caller, "burn_receipt")?;
        self.receipts.retire(from, amount)
    }

    fn receipt_balance(&self, holder: &Address) -> u128 {
        self.receipts.balance_of(holder)
    }
}
