// crates/tan-economics/src/craftsman.rs
//
// The Craftsman: multi-pool staking engine that turns the TAN emission rate
// into per-user rewards.
//
// Every user action settles the touched pool first:
//   pool_reward = units(last_reward_block, block) * rate * weight / total_weight
// mints pool_reward into the Workbench vault plus pool_reward / dev_fee_divisor
// to the dev address (both clamped by the token's headroom), and folds what
// was actually minted into the pool's accumulator. Any pending reward is then
// paid out of the vault before the position changes.
//
// Pool 0 is the self-staking pool: TAN in, Workbench receipts out. Its weight
// follows the staking ratio and is re-derived after every weight change.
//
// Every fallible operation is all-or-nothing: on error the engine, including
// the ledgers it owns, is restored to its state before the call.

use serde::{Deserialize, Serialize};
use tan_core::address::Address;
use tan_core::call::CallContext;
use tan_core::error::FarmError;
use tan_core::traits::{FungibleLedger, RewardMinter, StakingReceipt};
use tracing::{debug, info, warn};

use crate::bonus::{BonusWindow, DEFAULT_BONUS_MULTIPLIER};
use crate::emission::EpochUpdate;
use crate::governance::Ownable;
use crate::ledger::{AssetBook, Ledger};
use crate::pool::{DepositAsset, PoolInfo, PoolRegistry, UserPosition, STAKING_POOL_ID};
use crate::supply::RewardToken;
use crate::workbench::Workbench;

/// Upper bound on the staking pool's share of total weight.
pub const MAX_STAKING_RATIO_PERCENT: u8 = 50;

/// Construction parameters of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftsmanParams {
    /// No pool accrues before this block.
    #[serde(default)]
    pub start_block: u64,
    /// Weight of pool 0 until the first external pool is added.
    #[serde(default = "default_staking_pool_weight")]
    pub staking_pool_weight: u64,
    #[serde(default = "default_staking_ratio_percent")]
    pub staking_ratio_percent: u8,
    #[serde(default = "default_bonus_multiplier")]
    pub bonus_multiplier: u64,
    /// Blocks before this one earn `bonus_multiplier`. Unset keeps the
    /// multiplier in force on every block.
    #[serde(default)]
    pub bonus_end_block: Option<u64>,
    /// The dev cut is `pool_reward / dev_fee_divisor`.
    #[serde(default = "default_dev_fee_divisor")]
    pub dev_fee_divisor: u64,
}

fn default_staking_pool_weight() -> u64 {
    1000
}

fn default_staking_ratio_percent() -> u8 {
    25
}

fn default_bonus_multiplier() -> u64 {
    DEFAULT_BONUS_MULTIPLIER
}

fn default_dev_fee_divisor() -> u64 {
    10
}

impl Default for CraftsmanParams {
    fn default() -> Self {
        Self {
            start_block: 0,
            staking_pool_weight: default_staking_pool_weight(),
            staking_ratio_percent: default_staking_ratio_percent(),
            bonus_multiplier: default_bonus_multiplier(),
            bonus_end_block: None,
            dev_fee_divisor: default_dev_fee_divisor(),
        }
    }
}

/// Outcome of a user action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Reward paid out of the vault to the caller.
    pub reward_paid: u128,
    /// Principal moved in or out.
    pub amount: u128,
}

#[derive(Debug, Clone)]
pub struct Craftsman {
    address: Address,
    owner: Ownable,
    dev: Address,
    token: RewardToken,
    workbench: Workbench,
    assets: AssetBook,
    pools: PoolRegistry,
    bonus: BonusWindow,
    staking_ratio_percent: u8,
    start_block: u64,
    dev_fee_divisor: u64,
}

impl Craftsman {
    /// Create the engine with pool 0 in place.
    ///
    /// The engine must already be the owner (minter) of both `token` and
    /// `workbench`.
    ///
    /// # Errors
    /// Returns `FarmError::InvalidParameter` if either minter role is held by
    /// another account, `dev` is the zero address, the staking ratio exceeds
    /// `MAX_STAKING_RATIO_PERCENT` or the dev fee divisor is zero.
    pub fn new(
        address: Address,
        owner: Address,
        dev: Address,
        token: RewardToken,
        workbench: Workbench,
        params: CraftsmanParams,
    ) -> Result<Self, FarmError> {
        if token.owner() != address {
            return Err(FarmError::InvalidParameter(format!(
                "TAN is owned by {}, not the Craftsman {}",
                token.owner(),
                address
            )));
        }
        if workbench.owner() != address {
            return Err(FarmError::InvalidParameter(format!(
                "Workbench is owned by {}, not the Craftsman {}",
                workbench.owner(),
                address
            )));
        }
        if dev.is_zero() {
            return Err(FarmError::InvalidParameter(
                "Dev address is the zero address".to_string(),
            ));
        }
        if params.staking_ratio_percent > MAX_STAKING_RATIO_PERCENT {
            return Err(FarmError::InvalidParameter(format!(
                "Staking ratio {}% exceeds {}%",
                params.staking_ratio_percent, MAX_STAKING_RATIO_PERCENT
            )));
        }
        if params.dev_fee_divisor == 0 {
            return Err(FarmError::InvalidParameter(
                "Dev fee divisor must be non-zero".to_string(),
            ));
        }

        let mut pools = PoolRegistry::new();
        pools.push(PoolInfo::new(
            DepositAsset::RewardToken,
            params.staking_pool_weight,
            params.start_block,
        ))?;

        Ok(Self {
            address,
            owner: Ownable::new(owner),
            dev,
            token,
            workbench,
            assets: AssetBook::new(),
            pools,
            bonus: BonusWindow::new(params.bonus_multiplier, params.bonus_end_block),
            staking_ratio_percent: params.staking_ratio_percent,
            start_block: params.start_block,
            dev_fee_divisor: params.dev_fee_divisor,
        })
    }

    // --- Queries ---

    /// Account the engine acts as. Custodies staked TAN and pool deposits.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Holder of the administrative role.
    pub fn owner(&self) -> Address {
        self.owner.owner()
    }

    /// Recipient of the dev cut minted on each settlement.
    pub fn dev_address(&self) -> Address {
        self.dev
    }

    /// Number of pools, pool 0 included.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Snapshot of pool `pid`.
    ///
    /// # Errors
    /// Returns `FarmError::UnknownPool` if `pid` is out of range.
    pub fn pool(&self, pid: usize) -> Result<&PoolInfo, FarmError> {
        self.pools.get(pid)
    }

    /// All pools in id order.
    pub fn pools(&self) -> &[PoolInfo] {
        self.pools.pools()
    }

    /// `user`'s position in pool `pid`; an empty position if they never
    /// deposited.
    ///
    /// # Errors
    /// Returns `FarmError::UnknownPool` if `pid` is out of range.
    pub fn user_info(&self, pid: usize, user: &Address) -> Result<UserPosition, FarmError> {
        self.pools.get(pid)?;
        Ok(self.pools.position(pid, user))
    }

    /// Sum of all pool weights, pool 0 included.
    pub fn total_weight(&self) -> u64 {
        self.pools.total_weight()
    }

    /// TAN minted per block across all pools at the current epoch.
    pub fn emission_rate(&self) -> u128 {
        self.token.current_emission_rate()
    }

    /// TAN minted through farming so far. Excludes genesis allocations.
    pub fn circulating_supply(&self) -> u128 {
        self.token.circulating_supply()
    }

    pub fn max_supply(&self) -> u128 {
        self.token.max_supply()
    }

    /// Share of max supply reserved for farming emission.
    pub fn farm_supply(&self) -> u128 {
        self.token.farm_supply()
    }

    /// Pool 0's target share of total weight, in percent.
    pub fn staking_ratio_percent(&self) -> u8 {
        self.staking_ratio_percent
    }

    pub fn bonus(&self) -> &BonusWindow {
        &self.bonus
    }

    /// No pool accrues before this block.
    pub fn start_block(&self) -> u64 {
        self.start_block
    }

    pub fn reward_token(&self) -> &RewardToken {
        &self.token
    }

    pub fn workbench(&self) -> &Workbench {
        &self.workbench
    }

    /// External assets registered for pools.
    pub fn assets(&self) -> &AssetBook {
        &self.assets
    }

    /// Reward `user` could harvest from `pid` if the pool were settled at
    /// `block`. Read-only.
    pub fn pending_reward(&self, pid: usize, user: &Address, block: u64) -> Result<u128, FarmError> {
        let pool = self.pools.get(pid)?;
        let reward = self
            .pools
            .pool_reward(pid, block, self.emission_rate(), &self.bonus)?
            .unwrap_or(0);
        let minted = reward.min(self.token.headroom());
        let acc = pool.acc_after(minted)?;
        self.pools.position(pid, user).pending(acc)
    }

    // --- Ledger access for holders ---
    //
    // The engine owns the asset ledgers so a failed call can roll them back
    // together with its own state. Holders reach their balances through
    // these; none of them bypass a role check.

    /// Register an external asset that pools may later accept.
    pub fn register_asset(&mut self, ledger: Ledger) -> Result<Address, FarmError> {
        if ledger.address() == self.token.address() {
            return Err(FarmError::InvalidParameter(
                "TAN cannot be registered as an external asset".to_string(),
            ));
        }
        self.assets.register(ledger)
    }

    /// Mutable access to a registered asset ledger, for approvals and
    /// transfers between holders.
    ///
    /// # Errors
    /// Returns `FarmError::NotFound` if `asset` was never registered.
    pub fn asset_mut(&mut self, asset: &Address) -> Result<&mut Ledger, FarmError> {
        self.assets.get_mut(asset)
    }

    /// Mutable access to the TAN ledger. Minting stays gated on the engine's
    /// own address.
    pub fn reward_token_mut(&mut self) -> &mut RewardToken {
        &mut self.token
    }

    // --- Owner-gated administration ---

    /// Add a pool for `asset` and rebalance pool 0. Returns the new pool id.
    pub fn add_pool(
        &mut self,
        call: &CallContext,
        weight: u64,
        asset: Address,
    ) -> Result<usize, FarmError> {
        self.owner.ensure_owner(&call.sender, "add_pool")?;
        let symbol = self.assets.get(&asset)?.symbol().to_string();
        let deposit_asset = DepositAsset::External(asset);
        if self.pools.contains_asset(&deposit_asset) {
            return Err(FarmError::InvalidParameter(format!(
                "Asset {} ({}) already backs a pool",
                symbol, asset
            )));
        }

        self.atomically(|farm| {
            farm.settle_all(call.block)?;
            let last_reward_block = call.block.max(farm.start_block);
            let pid = farm
                .pools
                .push(PoolInfo::new(deposit_asset, weight, last_reward_block))?;
            let staking_weight = farm.pools.rebalance_staking_pool(farm.staking_ratio_percent)?;
            info!(
                pid,
                asset = %asset,
                symbol = %symbol,
                weight,
                staking_weight = ?staking_weight,
                total_weight = farm.pools.total_weight(),
                "Pool added"
            );
            Ok(pid)
        })
    }

    /// Reweight pool `pid` after settling every pool, then rebalance pool 0.
    ///
    /// # Errors
    /// Returns `FarmError::NotAuthorized` unless the caller is the owner,
    /// `FarmError::InvalidParameter` for pool 0 (its weight follows the
    /// staking ratio) and `FarmError::UnknownPool` for an unknown `pid`.
    pub fn set_pool_weight(
        &mut self,
        call: &CallContext,
        pid: usize,
        weight: u64,
    ) -> Result<(), FarmError> {
        self.owner.ensure_owner(&call.sender, "set_pool_weight")?;
        if pid == STAKING_POOL_ID {
            return Err(FarmError::InvalidParameter(
                "Pool 0 weight follows the staking ratio".to_string(),
            ));
        }
        self.pools.get(pid)?;

        self.atomically(|farm| {
            farm.settle_all(call.block)?;
            let previous = farm.pools.set_weight(pid, weight)?;
            let staking_weight = farm.pools.rebalance_staking_pool(farm.staking_ratio_percent)?;
            info!(
                pid,
                previous,
                weight,
                staking_weight = ?staking_weight,
                total_weight = farm.pools.total_weight(),
                "Pool weight updated"
            );
            Ok(())
        })
    }

    /// Set pool 0's target share of total weight after settling every pool.
    ///
    /// # Errors
    /// Returns `FarmError::NotAuthorized` unless the caller is the owner and
    /// `FarmError::InvalidParameter` if `ratio_percent` exceeds
    /// `MAX_STAKING_RATIO_PERCENT`.
    pub fn update_staking_ratio(
        &mut self,
        call: &CallContext,
        ratio_percent: u8,
    ) -> Result<(), FarmError> {
        self.owner.ensure_owner(&call.sender, "update_staking_ratio")?;
        if ratio_percent > MAX_STAKING_RATIO_PERCENT {
            return Err(FarmError::InvalidParameter(format!(
                "Staking ratio {}% exceeds {}%",
                ratio_percent, MAX_STAKING_RATIO_PERCENT
            )));
        }

        self.atomically(|farm| {
            farm.settle_all(call.block)?;
            farm.staking_ratio_percent = ratio_percent;
            let staking_weight = farm.pools.rebalance_staking_pool(ratio_percent)?;
            info!(
                ratio_percent,
                staking_weight = ?staking_weight,
                "Staking ratio updated"
            );
            Ok(())
        })
    }

    /// Change the bonus multiplier. Already-elapsed blocks are priced at
    /// whatever multiplier is current when their pool is next settled.
    ///
    /// # Errors
    /// Returns `FarmError::NotAuthorized` unless the caller is the owner.
    pub fn update_multiplier(&mut self, call: &CallContext, multiplier: u64) -> Result<(), FarmError> {
        self.owner.ensure_owner(&call.sender, "update_multiplier")?;
        self.bonus.multiplier = multiplier;
        info!(multiplier, end_block = ?self.bonus.end_block, "Bonus multiplier updated");
        Ok(())
    }

    /// Rotate the dev-cut recipient. Takes effect from the next settlement.
    ///
    /// # Errors
    /// Returns `FarmError::NotAuthorized` unless the caller is the owner and
    /// `FarmError::InvalidParameter` for the zero address.
    pub fn set_dev_address(&mut self, call: &CallContext, dev: Address) -> Result<(), FarmError> {
        self.owner.ensure_owner(&call.sender, "set_dev_address")?;
        if dev.is_zero() {
            return Err(FarmError::InvalidParameter(
                "Dev address is the zero address".to_string(),
            ));
        }
        info!(from = %self.dev, to = %dev, "Dev address updated");
        self.dev = dev;
        Ok(())
    }

    /// Settle every pool at the current rate, then move the token's schedule
    /// to the next epoch.
    ///
    /// # Errors
    /// Returns `FarmError::NotAuthorized` unless the caller is the owner and
    /// `FarmError::NotReady` before the current epoch has run its course.
    pub fn advance_epoch(&mut self, call: &CallContext) -> Result<EpochUpdate, FarmError> {
        self.owner.ensure_owner(&call.sender, "advance_epoch")?;
        self.atomically(|farm| {
            farm.settle_all(call.block)?;
            let engine = farm.address;
            farm.token.advance_epoch(&engine, call.timestamp)
        })
    }

    /// Hand the administrative role to `new_owner`.
    ///
    /// # Errors
    /// Returns `FarmError::NotAuthorized` unless the caller is the owner and
    /// `FarmError::InvalidParameter` for the zero address.
    pub fn transfer_ownership(
        &mut self,
        call: &CallContext,
        new_owner: Address,
    ) -> Result<(), FarmError> {
        let previous = self.owner.transfer(&call.sender, new_owner)?;
        info!(from = %previous, to = %new_owner, "Craftsman ownership transferred");
        Ok(())
    }

    // --- Permissionless settlement ---

    /// Settle every pool up to `call.block`. Callable by anyone.
    pub fn mass_update_pools(&mut self, call: &CallContext) -> Result<(), FarmError> {
        self.atomically(|farm| farm.settle_all(call.block))
    }

    /// Settle pool `pid` up to `call.block`. Callable by anyone.
    ///
    /// # Errors
    /// Returns `FarmError::UnknownPool` if `pid` is out of range.
    pub fn update_pool(&mut self, call: &CallContext, pid: usize) -> Result<(), FarmError> {
        self.atomically(|farm| farm.settle(pid, call.block))
    }

    // --- User actions ---

    /// Deposit `amount` of pool `pid`'s asset, harvesting pending reward
    /// first. `amount == 0` is a pure harvest.
    ///
    /// # Errors
    /// Returns `FarmError::InvalidParameter` on pool 0 (use `enter_staking`)
    /// and `FarmError::InsufficientAllowance` or
    /// `FarmError::InsufficientBalance` if the caller's approval or balance
    /// does not cover `amount`. Nothing changes on error.
    pub fn deposit(
        &mut self,
        call: &CallContext,
        pid: usize,
        amount: u128,
    ) -> Result<Settlement, FarmError> {
        let asset = self.external_asset(pid, "deposit")?;
        let user = call.sender;
        self.atomically(|farm| {
            farm.settle(pid, call.block)?;
            let reward_paid = farm.harvest(pid, &user)?;
            if amount > 0 {
                let engine = farm.address;
                farm.assets
                    .get_mut(&asset)?
                    .transfer_from(&engine, &user, &engine, amount)?;
                farm.pools.credit(pid, &user, amount)?;
            }
            farm.pools.sync_debt(pid, &user)?;
            debug!(pid, user = %user, amount, reward_paid, "Deposit");
            Ok(Settlement {
                reward_paid,
                amount,
            })
        })
    }

    /// Withdraw `amount` of pool `pid`'s asset, harvesting pending reward
    /// first. `amount == 0` is a pure harvest.
    ///
    /// # Errors
    /// Returns `FarmError::InsufficientBalance` if `amount` exceeds the
    /// caller's position and `FarmError::InvalidParameter` on pool 0.
    pub fn withdraw(
        &mut self,
        call: &CallContext,
        pid: usize,
        amount: u128,
    ) -> Result<Settlement, FarmError> {
        let asset = self.external_asset(pid, "withdraw")?;
        let user = call.sender;
        self.ensure_position(pid, &user, amount)?;
        self.atomically(|farm| {
            farm.settle(pid, call.block)?;
            let reward_paid = farm.harvest(pid, &user)?;
            if amount > 0 {
                farm.pools.debit(pid, &user, amount)?;
                let engine = farm.address;
                farm.assets.get_mut(&asset)?.transfer(&engine, &user, amount)?;
            }
            farm.pools.sync_debt(pid, &user)?;
            debug!(pid, user = %user, amount, reward_paid, "Withdraw");
            Ok(Settlement {
                reward_paid,
                amount,
            })
        })
    }

    /// Stake TAN into pool 0 and receive the same amount of Workbench
    /// receipts.
    pub fn enter_staking(&mut self, call: &CallContext, amount: u128) -> Result<Settlement, FarmError> {
        let user = call.sender;
        self.atomically(|farm| {
            farm.settle(STAKING_POOL_ID, call.block)?;
            let reward_paid = farm.harvest(STAKING_POOL_ID, &user)?;
            if amount > 0 {
                let engine = farm.address;
                farm.token.transfer_from(&engine, &user, &engine, amount)?;
                farm.pools.credit(STAKING_POOL_ID, &user, amount)?;
                farm.workbench.mint_receipt(&engine, &user, amount)?;
            }
            farm.pools.sync_debt(STAKING_POOL_ID, &user)?;
            debug!(user = %user, amount, reward_paid, "Enter staking");
            Ok(Settlement {
                reward_paid,
                amount,
            })
        })
    }

    /// Unstake TAN from pool 0, burning the matching receipts.
    ///
    /// # Errors
    /// Returns `FarmError::InsufficientBalance` if `amount` exceeds the
    /// caller's stake.
    pub fn leave_staking(&mut self, call: &CallContext, amount: u128) -> Result<Settlement, FarmError> {
        let user = call.sender;
        self.ensure_position(STAKING_POOL_ID, &user, amount)?;
        self.atomically(|farm| {
            farm.settle(STAKING_POOL_ID, call.block)?;
            let reward_paid = farm.harvest(STAKING_POOL_ID, &user)?;
            if amount > 0 {
                let engine = farm.address;
                farm.pools.debit(STAKING_POOL_ID, &user, amount)?;
                farm.workbench.burn_receipt(&engine, &user, amount)?;
                farm.token.transfer(&engine, &user, amount)?;
            }
            farm.pools.sync_debt(STAKING_POOL_ID, &user)?;
            debug!(user = %user, amount, reward_paid, "Leave staking");
            Ok(Settlement {
                reward_paid,
                amount,
            })
        })
    }

    /// Return the caller's whole principal without settling. Pending reward
    /// is forfeited.
    pub fn emergency_withdraw(&mut self, call: &CallContext, pid: usize) -> Result<Settlement, FarmError> {
        let asset = self.pools.get(pid)?.asset;
        let user = call.sender;
        self.atomically(|farm| {
            let amount = farm.pools.clear(pid, &user)?;
            let engine = farm.address;
            match asset {
                DepositAsset::RewardToken => {
                    farm.workbench.burn_receipt(&engine, &user, amount)?;
                    farm.token.transfer(&engine, &user, amount)?;
                }
                DepositAsset::External(asset) => {
                    farm.assets.get_mut(&asset)?.transfer(&engine, &user, amount)?;
                }
            }
            warn!(pid, user = %user, amount, "Emergency withdraw");
            Ok(Settlement {
                reward_paid: 0,
                amount,
            })
        })
    }

    // --- Internals ---

    /// Run `op`, restoring the pre-call state if it fails.
    ///
    /// The snapshot is a full clone of the engine, asset ledgers and
    /// positions included, so every call costs O(total state).
    fn atomically<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, FarmError>,
    ) -> Result<T, FarmError> {
        let snapshot = self.clone();
        let result = op(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    fn external_asset(&self, pid: usize, action: &str) -> Result<Address, FarmError> {
        match self.pools.get(pid)?.asset {
            DepositAsset::External(asset) => Ok(asset),
            DepositAsset::RewardToken => Err(FarmError::InvalidParameter(format!(
                "{} on pool 0: use the staking calls",
                action
            ))),
        }
    }

    fn ensure_position(&self, pid: usize, user: &Address, amount: u128) -> Result<(), FarmError> {
        self.pools.get(pid)?;
        let available = self.pools.position(pid, user).amount;
        if amount > available {
            return Err(FarmError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    fn settle_all(&mut self, block: u64) -> Result<(), FarmError> {
        for pid in 0..self.pools.len() {
            self.settle(pid, block)?;
        }
        Ok(())
    }

    fn settle(&mut self, pid: usize, block: u64) -> Result<(), FarmError> {
        let rate = self.token.current_emission_rate();
        let Some(reward) = self.pools.pool_reward(pid, block, rate, &self.bonus)? else {
            return Ok(());
        };

        let mut minted = 0;
        if reward > 0 {
            let vault = self.workbench.address();
            minted = self.token.mint(&self.address, &vault, reward)?;
            let dev_fee = reward / self.dev_fee_divisor as u128;
            if dev_fee > 0 {
                self.token.mint(&self.address, &self.dev, dev_fee)?;
            }
        }
        self.pools.accrue(pid, block, minted)?;
        debug!(pid, block, reward, minted, "Pool settled");
        Ok(())
    }

    fn harvest(&mut self, pid: usize, user: &Address) -> Result<u128, FarmError> {
        let acc = self.pools.get(pid)?.acc_reward_per_share;
        let pending = self.pools.position(pid, user).pending(acc)?;
        if pending == 0 {
            return Ok(0);
        }
        self.workbench
            .safe_reward_transfer(&self.address, &mut self.token, user, pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::EmissionParams;
    use crate::supply::default_genesis;

    struct Farm {
        craft: Craftsman,
        owner: Address,
        lp: Vec<Address>,
    }

    // Max supply chosen so that epoch 0 emits exactly 1000 per block.
    fn farm() -> Farm {
        let engine = Address::derive("craftsman");
        let owner = Address::derive("owner");
        let token = RewardToken::new(
            Address::derive("tan"),
            engine,
            65_454_545_455,
            66,
            EmissionParams::default(),
            &default_genesis(),
            0,
        )
        .unwrap();
        let workbench = Workbench::new(Address::derive("workbench"), engine);
        let mut craft = Craftsman::new(
            engine,
            owner,
            Address::derive("dev"),
            token,
            workbench,
            CraftsmanParams::default(),
        )
        .unwrap();

        let mut lp = Vec::new();
        for i in 1..=3 {
            let mut ledger = Ledger::new(Address::derive(&format!("lp{}", i)), format!("LP{}", i));
            for user in ["alice", "bob"] {
                ledger.issue(&Address::derive(user), 2000).unwrap();
            }
            lp.push(craft.register_asset(ledger).unwrap());
        }
        Farm { craft, owner, lp }
    }

    fn at(sender: Address, block: u64) -> CallContext {
        CallContext::new(sender, block, 0)
    }

    #[test]
    fn test_new_requires_minter_roles() {
        let engine = Address::derive("craftsman");
        let token = RewardToken::new(
            Address::derive("tan"),
            Address::derive("someone"),
            1_000_000,
            66,
            EmissionParams::default(),
            &[],
            0,
        )
        .unwrap();
        let result = Craftsman::new(
            engine,
            Address::derive("owner"),
            Address::derive("dev"),
            token,
            Workbench::new(Address::derive("workbench"), engine),
            CraftsmanParams::default(),
        );
        assert!(matches!(result, Err(FarmError::InvalidParameter(_))));
    }

    #[test]
    fn test_initial_state() {
        let f = farm();
        assert_eq!(f.craft.pool_count(), 1);
        assert_eq!(f.craft.total_weight(), 1000);
        assert_eq!(f.craft.staking_ratio_percent(), 25);
        assert_eq!(f.craft.emission_rate(), 1000);
        assert_eq!(f.craft.pool(0).unwrap().asset, DepositAsset::RewardToken);
    }

    #[test]
    fn test_add_pool_rebalances() {
        let mut f = farm();
        let call = at(f.owner, 1);
        for lp in f.lp.clone() {
            f.craft.add_pool(&call, 1000, lp).unwrap();
        }
        assert_eq!(f.craft.pool(0).unwrap().weight, 1000);
        assert_eq!(f.craft.total_weight(), 4000);
    }

    #[test]
    fn test_add_pool_rejections() {
        let mut f = farm();
        let lp1 = f.lp[0];
        let alice = Address::derive("alice");
        assert!(matches!(
            f.craft.add_pool(&at(alice, 1), 1000, lp1),
            Err(FarmError::NotAuthorized(_))
        ));
        f.craft.add_pool(&at(f.owner, 1), 1000, lp1).unwrap();
        assert!(matches!(
            f.craft.add_pool(&at(f.owner, 1), 500, lp1),
            Err(FarmError::InvalidParameter(_))
        ));
        assert!(matches!(
            f.craft.add_pool(&at(f.owner, 1), 500, Address::derive("unregistered")),
            Err(FarmError::NotFound(_))
        ));
        assert_eq!(f.craft.pool_count(), 2);
    }

    #[test]
    fn test_set_pool_weight_guards() {
        let mut f = farm();
        f.craft.add_pool(&at(f.owner, 1), 1000, f.lp[0]).unwrap();
        assert!(matches!(
            f.craft.set_pool_weight(&at(f.owner, 2), 0, 10),
            Err(FarmError::InvalidParameter(_))
        ));
        assert_eq!(
            f.craft.set_pool_weight(&at(f.owner, 2), 9, 10).unwrap_err(),
            FarmError::UnknownPool(9)
        );
        f.craft.set_pool_weight(&at(f.owner, 2), 1, 3000).unwrap();
        assert_eq!(f.craft.pool(0).unwrap().weight, 1000);
        assert_eq!(f.craft.total_weight(), 4000);
    }

    #[test]
    fn test_deposit_into_pool_zero_rejected() {
        let mut f = farm();
        let alice = Address::derive("alice");
        assert!(matches!(
            f.craft.deposit(&at(alice, 1), 0, 10),
            Err(FarmError::InvalidParameter(_))
        ));
        assert!(matches!(
            f.craft.withdraw(&at(alice, 1), 0, 0),
            Err(FarmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_pending_reward_matches_harvest() {
        let mut f = farm();
        let alice = Address::derive("alice");
        for lp in f.lp.clone() {
            f.craft.add_pool(&at(f.owner, 1), 1000, lp).unwrap();
        }
        let engine = f.craft.address();
        f.craft.asset_mut(&f.lp[0]).unwrap().approve(&alice, &engine, 100);
        f.craft.deposit(&at(alice, 10), 1, 20).unwrap();

        assert_eq!(f.craft.pending_reward(1, &alice, 14).unwrap(), 1000);
        let settled = f.craft.deposit(&at(alice, 14), 1, 0).unwrap();
        assert_eq!(settled.reward_paid, 1000);
        assert_eq!(f.craft.pending_reward(1, &alice, 14).unwrap(), 0);
    }

    #[test]
    fn test_dev_rotation_owner_only() {
        let mut f = farm();
        let bob = Address::derive("bob");
        assert!(matches!(
            f.craft.set_dev_address(&at(bob, 1), bob),
            Err(FarmError::NotAuthorized(_))
        ));
        assert!(matches!(
            f.craft.set_dev_address(&at(f.owner, 1), Address::ZERO),
            Err(FarmError::InvalidParameter(_))
        ));
        f.craft.set_dev_address(&at(f.owner, 1), bob).unwrap();
        assert_eq!(f.craft.dev_address(), bob);
    }
}
