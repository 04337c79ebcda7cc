// crates/tan-economics/src/emission.rs
//
// Epoch-based decaying emission schedule.
//
// Once per epoch (30 days by default) the per-block mint rate is recomputed:
//   remaining        = farm_supply - circulating_supply
//   supply_per_epoch = remaining * epoch_fraction         (1% by default)
//   supply_per_block = supply_per_epoch * block_time / epoch_duration
//
// Each epoch mints a fixed fraction of what remains, so the rate decays
// geometrically and supply approaches the farm allocation asymptotically.
// The schedule never mints by itself; it only prices blocks.

use serde::{Deserialize, Serialize};
use tan_core::error::FarmError;

use crate::math::mul_div;

/// Length of one emission epoch: 30 days in seconds.
pub const EPOCH_DURATION_SECS: u64 = 30 * 24 * 60 * 60;

/// Target block interval in seconds.
pub const BLOCK_TIME_SECS: u64 = 6;

/// Share of the remaining farm supply emitted per epoch, in basis points (1%).
pub const EPOCH_FRACTION_BPS: u32 = 100;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Share of max supply reserved for farming emission (66%).
pub const FARM_SUPPLY_PERCENT: u8 = 66;

/// Tunable parameters of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionParams {
    #[serde(default = "default_epoch_duration_secs")]
    pub epoch_duration_secs: u64,
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,
    #[serde(default = "default_epoch_fraction_bps")]
    pub epoch_fraction_bps: u32,
}

fn default_epoch_duration_secs() -> u64 {
    EPOCH_DURATION_SECS
}

fn default_block_time_secs() -> u64 {
    BLOCK_TIME_SECS
}

fn default_epoch_fraction_bps() -> u32 {
    EPOCH_FRACTION_BPS
}

impl Default for EmissionParams {
    fn default() -> Self {
        Self {
            epoch_duration_secs: default_epoch_duration_secs(),
            block_time_secs: default_block_time_secs(),
            epoch_fraction_bps: default_epoch_fraction_bps(),
        }
    }
}

impl EmissionParams {
    /// # Errors
    /// Returns `FarmError::InvalidParameter` for a zero epoch or block time,
    /// or an epoch fraction outside `1..=10000` bps.
    pub fn validate(&self) -> Result<(), FarmError> {
        if self.epoch_duration_secs == 0 || self.block_time_secs == 0 {
            return Err(FarmError::InvalidParameter(
                "Epoch duration and block time must be non-zero".to_string(),
            ));
        }
        if self.epoch_fraction_bps == 0 || self.epoch_fraction_bps as u128 > BPS_DENOMINATOR {
            return Err(FarmError::InvalidParameter(format!(
                "Epoch fraction {} bps must be within 1..={}",
                self.epoch_fraction_bps, BPS_DENOMINATOR
            )));
        }
        Ok(())
    }
}

/// Supply emitted over one epoch out of `remaining`.
pub fn epoch_supply(remaining: u128, fraction_bps: u32) -> Result<u128, FarmError> {
    mul_div(remaining, fraction_bps as u128, BPS_DENOMINATOR)
}

/// Per-block share of an epoch's supply, rounding toward zero.
pub fn supply_per_block(epoch_supply: u128, params: &EmissionParams) -> Result<u128, FarmError> {
    mul_div(
        epoch_supply,
        params.block_time_secs as u128,
        params.epoch_duration_secs as u128,
    )
}

/// Result of (re)computing the schedule for an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochUpdate {
    /// Epoch number, 0 for the one computed at creation.
    pub epoch: u64,
    /// Unix seconds at which the epoch started.
    pub timestamp: i64,
    /// Circulating supply the epoch was priced from.
    pub circulating_supply: u128,
    /// Farm supply still unminted when the epoch started.
    pub remaining: u128,
    pub supply_per_epoch: u128,
    pub supply_per_block: u128,
}

/// The live schedule, owned by the reward token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionSchedule {
    params: EmissionParams,
    farm_supply: u128,
    epoch: u64,
    supply_per_epoch: u128,
    supply_per_block: u128,
    last_update_timestamp: i64,
}

impl EmissionSchedule {
    /// Create a schedule and price epoch 0 immediately at `now`.
    pub fn new(
        farm_supply: u128,
        params: EmissionParams,
        circulating_supply: u128,
        now: i64,
    ) -> Result<Self, FarmError> {
        params.validate()?;
        let mut schedule = Self {
            params,
            farm_supply,
            epoch: 0,
            supply_per_epoch: 0,
            supply_per_block: 0,
            last_update_timestamp: now,
        };
        schedule.reprice(circulating_supply, now)?;
        Ok(schedule)
    }

    /// The last computed per-block mint amount.
    pub fn current_emission_rate(&self) -> u128 {
        self.supply_per_block
    }

    pub fn supply_per_epoch(&self) -> u128 {
        self.supply_per_epoch
    }

    pub fn farm_supply(&self) -> u128 {
        self.farm_supply
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn last_update_timestamp(&self) -> i64 {
        self.last_update_timestamp
    }

    pub fn params(&self) -> &EmissionParams {
        &self.params
    }

    /// Earliest timestamp at which `advance_epoch` succeeds.
    pub fn next_update_at(&self) -> i64 {
        self.last_update_timestamp
            .saturating_add(self.params.epoch_duration_secs as i64)
    }

    pub fn is_ready(&self, now: i64) -> bool {
        now >= self.next_update_at()
    }

    /// Move to the next epoch and reprice from `circulating_supply`.
    ///
    /// # Errors
    /// Returns `FarmError::NotReady` (leaving the schedule untouched) if less
    /// than one epoch has elapsed since the last update.
    pub fn advance_epoch(
        &mut self,
        circulating_supply: u128,
        now: i64,
    ) -> Result<EpochUpdate, FarmError> {
        if !self.is_ready(now) {
            return Err(FarmError::NotReady(format!(
                "Emission epoch {} runs until {}, now is {}",
                self.epoch,
                self.next_update_at(),
                now
            )));
        }
        let mut next = self.clone();
        next.epoch += 1;
        let update = next.reprice(circulating_supply, now)?;
        *self = next;
        Ok(update)
    }

    fn reprice(&mut self, circulating_supply: u128, now: i64) -> Result<EpochUpdate, FarmError> {
        let remaining = self.farm_supply.saturating_sub(circulating_supply);
        let per_epoch = epoch_supply(remaining, self.params.epoch_fraction_bps)?;
        let per_block = supply_per_block(per_epoch, &self.params)?;

        self.supply_per_epoch = per_epoch;
        self.supply_per_block = per_block;
        self.last_update_timestamp = now;

        Ok(EpochUpdate {
            epoch: self.epoch,
            timestamp: now,
            circulating_supply,
            remaining,
            supply_per_epoch: per_epoch,
            supply_per_block: per_block,
        })
    }
}

/// Longest projection `project` accepts: a century of 30-day epochs.
pub const MAX_PROJECTED_EPOCHS: u64 = 1_200;

/// Project the schedule `epochs` epochs ahead, assuming every epoch's supply
/// is fully minted before the next repricing.
///
/// # Errors
/// Returns `FarmError::InvalidParameter` if `epochs` exceeds
/// `MAX_PROJECTED_EPOCHS`.
pub fn project(
    farm_supply: u128,
    params: &EmissionParams,
    start: i64,
    epochs: u64,
) -> Result<Vec<EpochUpdate>, FarmError> {
    if epochs > MAX_PROJECTED_EPOCHS {
        return Err(FarmError::InvalidParameter(format!(
            "Cannot project {} epochs; the limit is {}",
            epochs, MAX_PROJECTED_EPOCHS
        )));
    }
    let mut schedule = EmissionSchedule::new(farm_supply, *params, 0, start)?;
    let mut circulating: u128 = 0;
    let mut rows = Vec::with_capacity(epochs as usize);
    let mut now = start;

    for epoch in 0..epochs {
        if epoch > 0 {
            circulating = circulating.saturating_add(schedule.supply_per_epoch());
            now = schedule.next_update_at();
            schedule.advance_epoch(circulating, now)?;
        }
        let remaining = farm_supply.saturating_sub(circulating);
        rows.push(EpochUpdate {
            epoch: schedule.epoch(),
            timestamp: now,
            circulating_supply: circulating,
            remaining,
            supply_per_epoch: schedule.supply_per_epoch(),
            supply_per_block: schedule.current_emission_rate(),
        });
    }

    Ok(rows)
}
