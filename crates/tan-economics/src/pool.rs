// crates/tan-economics/src/pool.rs
//
// Pool registry and per-share reward accounting.
//
// Each pool carries a reward-per-share accumulator scaled by ACC_PRECISION.
// When a pool is settled over a block range, the minted reward R is spread
// across everything deposited:
//   acc += R * ACC_PRECISION / total_deposited
// A user's claimable reward is then
//   amount * acc / ACC_PRECISION - reward_debt
// where reward_debt is the same product snapshotted at their last touch.
//
// Pool 0 is the self-staking pool (TAN deposited into TAN). Its weight is
// never set directly; it is re-derived from the other pools' weights so it
// holds `staking_ratio_percent` of the total.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tan_core::address::Address;
use tan_core::error::FarmError;

use crate::bonus::BonusWindow;
use crate::math::{self, mul_div};

/// Fixed-point scale of `acc_reward_per_share`.
pub const ACC_PRECISION: u128 = 1_000_000_000_000;

/// Id of the self-staking pool.
pub const STAKING_POOL_ID: usize = 0;

/// What a pool accepts as deposits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "address", rename_all = "snake_case")]
pub enum DepositAsset {
    /// TAN itself; only pool 0.
    RewardToken,
    /// An external fungible asset, by address.
    External(Address),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub asset: DepositAsset,
    pub weight: u64,
    pub last_reward_block: u64,
    pub acc_reward_per_share: u128,
    pub total_deposited: u128,
}

impl PoolInfo {
    pub fn new(asset: DepositAsset, weight: u64, last_reward_block: u64) -> Self {
        Self {
            asset,
            weight,
            last_reward_block,
            acc_reward_per_share: 0,
            total_deposited: 0,
        }
    }

    /// The accumulator after spreading `minted` over the current deposits.
    pub fn acc_after(&self, minted: u128) -> Result<u128, FarmError> {
        if self.total_deposited == 0 || minted == 0 {
            return Ok(self.acc_reward_per_share);
        }
        let delta = mul_div(minted, ACC_PRECISION, self.total_deposited)?;
        math::add(self.acc_reward_per_share, delta, "acc_reward_per_share")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    pub amount: u128,
    pub reward_debt: u128,
}

impl UserPosition {
    /// `amount * acc / ACC_PRECISION`.
    pub fn accrued(&self, acc_reward_per_share: u128) -> Result<u128, FarmError> {
        mul_div(self.amount, acc_reward_per_share, ACC_PRECISION)
    }

    /// Reward earned since the last debt snapshot.
    pub fn pending(&self, acc_reward_per_share: u128) -> Result<u128, FarmError> {
        // acc only grows while amount is fixed, so accrued >= reward_debt.
        Ok(self
            .accrued(acc_reward_per_share)?
            .saturating_sub(self.reward_debt))
    }
}

/// Ordered pools plus every (pool, user) position.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: Vec<PoolInfo>,
    positions: BTreeMap<(usize, Address), UserPosition>,
    total_weight: u64,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn pools(&self) -> &[PoolInfo] {
        &self.pools
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn get(&self, pid: usize) -> Result<&PoolInfo, FarmError> {
        self.pools.get(pid).ok_or(FarmError::UnknownPool(pid))
    }

    fn get_mut(&mut self, pid: usize) -> Result<&mut PoolInfo, FarmError> {
        self.pools.get_mut(pid).ok_or(FarmError::UnknownPool(pid))
    }

    /// A user's position; all-zero if they never deposited.
    pub fn position(&self, pid: usize, user: &Address) -> UserPosition {
        self.positions
            .get(&(pid, *user))
            .copied()
            .unwrap_or_default()
    }

    pub fn contains_asset(&self, asset: &DepositAsset) -> bool {
        self.pools.iter().any(|p| p.asset == *asset)
    }

    /// Append a pool and return its id.
    pub fn push(&mut self, pool: PoolInfo) -> Result<usize, FarmError> {
        self.total_weight = self
            .total_weight
            .checked_add(pool.weight)
            .ok_or_else(|| FarmError::Overflow("total pool weight".to_string()))?;
        self.pools.push(pool);
        Ok(self.pools.len() - 1)
    }

    /// Set a pool's weight, keeping `total_weight` in step. Returns the
    /// previous weight.
    pub fn set_weight(&mut self, pid: usize, weight: u64) -> Result<u64, FarmError> {
        let previous = self.get(pid)?.weight;
        self.total_weight = (self.total_weight - previous)
            .checked_add(weight)
            .ok_or_else(|| FarmError::Overflow("total pool weight".to_string()))?;
        self.get_mut(pid)?.weight = weight;
        Ok(previous)
    }

    /// Sum of every pool weight except the staking pool's.
    pub fn non_staking_weight(&self) -> u64 {
        self.pools
            .iter()
            .enumerate()
            .filter(|(pid, _)| *pid != STAKING_POOL_ID)
            .map(|(_, p)| p.weight)
            .sum()
    }

    /// Re-derive the staking pool's weight so it holds `ratio_percent` of the
    /// total: `floor(ratio * others / (100 - ratio))`.
    ///
    /// Does nothing while pool 0 is the only pool. Returns the new weight if
    /// one was set.
    pub fn rebalance_staking_pool(&mut self, ratio_percent: u8) -> Result<Option<u64>, FarmError> {
        if self.pools.len() <= 1 {
            return Ok(None);
        }
        if ratio_percent >= 100 {
            return Err(FarmError::InvalidParameter(format!(
                "Staking ratio {}% must be below 100%",
                ratio_percent
            )));
        }
        let others = self.non_staking_weight() as u128;
        let weight = mul_div(
            others,
            ratio_percent as u128,
            100 - ratio_percent as u128,
        )?;
        let weight = u64::try_from(weight)
            .map_err(|_| FarmError::Overflow("staking pool weight".to_string()))?;
        self.set_weight(STAKING_POOL_ID, weight)?;
        Ok(Some(weight))
    }

    /// Reward owed to `pid` for the blocks up to `block` at `rate` per block.
    ///
    /// `None` means the pool is already settled at `block`. `Some(0)` means
    /// blocks elapsed but nothing accrues (empty pool or zero total weight);
    /// the pool must still be advanced.
    pub fn pool_reward(
        &self,
        pid: usize,
        block: u64,
        rate: u128,
        bonus: &BonusWindow,
    ) -> Result<Option<u128>, FarmError> {
        let pool = self.get(pid)?;
        if block <= pool.last_reward_block {
            return Ok(None);
        }
        if pool.total_deposited == 0 || self.total_weight == 0 || pool.weight == 0 {
            return Ok(Some(0));
        }
        let units = bonus.effective_multiplier(pool.last_reward_block, block);
        let emitted = units
            .checked_mul(rate)
            .ok_or_else(|| FarmError::Overflow(format!("pool {} emission", pid)))?;
        Ok(Some(mul_div(
            emitted,
            pool.weight as u128,
            self.total_weight as u128,
        )?))
    }

    /// Fold `minted` into the accumulator and mark the pool settled at
    /// `block`.
    pub fn accrue(&mut self, pid: usize, block: u64, minted: u128) -> Result<(), FarmError> {
        let pool = self.get_mut(pid)?;
        pool.acc_reward_per_share = pool.acc_after(minted)?;
        pool.last_reward_block = block;
        Ok(())
    }

    pub fn credit(&mut self, pid: usize, user: &Address, amount: u128) -> Result<(), FarmError> {
        let pool = self.get_mut(pid)?;
        pool.total_deposited = math::add(pool.total_deposited, amount, "pool deposits")?;
        let position = self.positions.entry((pid, *user)).or_default();
        position.amount = math::add(position.amount, amount, "position")?;
        Ok(())
    }

    pub fn debit(&mut self, pid: usize, user: &Address, amount: u128) -> Result<(), FarmError> {
        let position = self.position(pid, user);
        if amount > position.amount {
            return Err(FarmError::InsufficientBalance {
                requested: amount,
                available: position.amount,
            });
        }
        let pool = self.get_mut(pid)?;
        pool.total_deposited -= amount;
        if let Some(p) = self.positions.get_mut(&(pid, *user)) {
            p.amount -= amount;
        }
        Ok(())
    }

    /// Snapshot the user's reward debt at the pool's current accumulator.
    pub fn sync_debt(&mut self, pid: usize, user: &Address) -> Result<(), FarmError> {
        let acc = self.get(pid)?.acc_reward_per_share;
        let position = self.positions.entry((pid, *user)).or_default();
        position.reward_debt = position.accrued(acc)?;
        Ok(())
    }

    /// Zero a position without settling and return the principal it held.
    pub fn clear(&mut self, pid: usize, user: &Address) -> Result<u128, FarmError> {
        let amount = self.position(pid, user).amount;
        let pool = self.get_mut(pid)?;
        pool.total_deposited -= amount;
        if let Some(p) = self.positions.get_mut(&(pid, *user)) {
            *p = UserPosition::default();
        }
        Ok(amount)
    }
}
