// crates/tan-economics/src/supply.rs
//
// The TAN reward token: a capped fungible ledger with a single minter (its
// owner, normally the Craftsman) and the emission schedule that prices each
// block.
//
// Supply is split in two buckets:
//   - genesis_supply:     allocations credited at creation (DAO, growth, ...)
//   - circulating_supply: everything minted through the farm path
//
// Only circulating_supply feeds the emission curve. Mints are clamped to
//   headroom = max_supply - genesis_supply - circulating_supply
// so the ceiling holds regardless of how many mints are requested.

use serde::{Deserialize, Serialize};
use tan_core::address::Address;
use tan_core::error::FarmError;
use tan_core::traits::{FungibleLedger, RewardMinter};
use tracing::{info, warn};

use crate::emission::{EmissionParams, EmissionSchedule, EpochUpdate};
use crate::governance::Ownable;
use crate::ledger::Ledger;
use crate::math::{self, mul_div};
use crate::token::SYMBOL;

/// A share of max supply credited at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAllocation {
    pub recipient: Address,
    pub percent: u8,
}

impl GenesisAllocation {
    pub fn new(recipient: Address, percent: u8) -> Self {
        Self { recipient, percent }
    }
}

/// The default genesis split: 11% DAO, 11% growth, 11% liquidity, 1% team.
pub fn default_genesis() -> Vec<GenesisAllocation> {
    vec![
        GenesisAllocation::new(Address::derive("dao"), 11),
        GenesisAllocation::new(Address::derive("growth"), 11),
        GenesisAllocation::new(Address::derive("liquidity"), 11),
        GenesisAllocation::new(Address::derive("team"), 1),
    ]
}

#[derive(Debug, Clone)]
pub struct RewardToken {
    ledger: Ledger,
    owner: Ownable,
    max_supply: u128,
    genesis_supply: u128,
    circulating_supply: u128,
    schedule: EmissionSchedule,
}

impl RewardToken {
    /// Create the token, credit the genesis allocations, and price epoch 0
    /// from `now`.
    ///
    /// # Errors
    /// Returns `FarmError::InvalidParameter` if `farm_percent` exceeds 100 or
    /// the genesis allocations claim more than what the farm leaves over.
    pub fn new(
        address: Address,
        owner: Address,
        max_supply: u128,
        farm_percent: u8,
        params: EmissionParams,
        genesis: &[GenesisAllocation],
        now: i64,
    ) -> Result<Self, FarmError> {
        if farm_percent > 100 {
            return Err(FarmError::InvalidParameter(format!(
                "Farm share {}% exceeds 100%",
                farm_percent
            )));
        }
        let genesis_percent: u32 = genesis.iter().map(|a| a.percent as u32).sum();
        if genesis_percent + farm_percent as u32 > 100 {
            return Err(FarmError::InvalidParameter(format!(
                "Genesis allocations ({}%) and farm share ({}%) exceed 100%",
                genesis_percent, farm_percent
            )));
        }

        let mut ledger = Ledger::new(address, SYMBOL);
        let mut genesis_supply: u128 = 0;
        for allocation in genesis {
            let amount = mul_div(max_supply, allocation.percent as u128, 100)?;
            ledger.issue(&allocation.recipient, amount)?;
            genesis_supply = math::add(genesis_supply, amount, "genesis supply")?;
        }

        let farm_supply = mul_div(max_supply, farm_percent as u128, 100)?;
        let schedule = EmissionSchedule::new(farm_supply, params, 0, now)?;

        info!(
            max_supply,
            farm_supply,
            genesis_supply,
            supply_per_block = schedule.current_emission_rate(),
            "TAN token created"
        );

        Ok(Self {
            ledger,
            owner: Ownable::new(owner),
            max_supply,
            genesis_supply,
            circulating_supply: 0,
            schedule,
        })
    }

    pub fn address(&self) -> Address {
        self.ledger.address()
    }

    pub fn owner(&self) -> Address {
        self.owner.owner()
    }

    pub fn max_supply(&self) -> u128 {
        self.max_supply
    }

    pub fn genesis_supply(&self) -> u128 {
        self.genesis_supply
    }

    /// Everything minted through the farm path so far.
    pub fn circulating_supply(&self) -> u128 {
        self.circulating_supply
    }

    pub fn farm_supply(&self) -> u128 {
        self.schedule.farm_supply()
    }

    pub fn current_emission_rate(&self) -> u128 {
        self.schedule.current_emission_rate()
    }

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), FarmError> {
        let previous = self.owner.transfer(caller, new_owner)?;
        info!(from = %previous, to = %new_owner, "TAN ownership transferred");
        Ok(())
    }

    /// Reprice the schedule for the next epoch. Owner only.
    pub fn advance_epoch(&mut self, caller: &Address, now: i64) -> Result<EpochUpdate, FarmError> {
        self.owner.ensure_owner(caller, "advance_epoch")?;
        let update = self.schedule.advance_epoch(self.circulating_supply, now)?;
        info!(
            epoch = update.epoch,
            remaining = update.remaining,
            supply_per_epoch = update.supply_per_epoch,
            supply_per_block = update.supply_per_block,
            "Emission epoch advanced"
        );
        Ok(update)
    }
}

impl FungibleLedger for RewardToken {
    fn balance_of(&self, holder: &Address) -> u128 {
        self.ledger.balance_of(holder)
    }

    fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.ledger.allowance(owner, spender)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.ledger.approve(owner, spender, amount)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), FarmError> {
        self.ledger.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), FarmError> {
        self.ledger.transfer_from(spender, from, to, amount)
    }
}

impl RewardMinter for RewardToken {
    fn mint(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<u128, FarmError> {
        self.owner.ensure_owner(caller, "mint")?;
        let headroom = self.headroom();
        let minted = amount.min(headroom);
        if minted < amount {
            warn!(
                requested = amount,
                minted,
                "TAN mint clamped to remaining supply"
            );
        }
        if minted == 0 {
            return Ok(0);
        }
        self.ledger.issue(to, minted)?;
        self.circulating_supply += minted;
        Ok(minted)
    }

    fn headroom(&self) -> u128 {
        self.max_supply
            .saturating_sub(self.genesis_supply)
            .saturating_sub(self.circulating_supply)
    }
}
