// crates/tan-economics/src/lib.rs
//
// tan-economics: the TAN reward token and its decaying emission schedule,
// the Craftsman multi-pool staking engine, Workbench receipts, and the
// governance wrappers around them.
//
// All monetary values are tracked in wei (the smallest unit of TAN).
// 1 TAN = 1,000,000,000,000,000,000 wei (10^18).

pub mod bonus;
pub mod config;
pub mod craftsman;
pub mod emission;
pub mod governance;
pub mod ledger;
pub mod math;
pub mod pool;
pub mod supply;
pub mod timelock;
pub mod token;
pub mod workbench;

// Re-export key types for ergonomic access from downstream crates.
pub use bonus::BonusWindow;
pub use config::{FarmConfig, SimulatedPool, SimulationConfig};
pub use craftsman::{Craftsman, CraftsmanParams, Settlement, MAX_STAKING_RATIO_PERCENT};
pub use emission::{
    project, EmissionParams, EmissionSchedule, EpochUpdate, BLOCK_TIME_SECS,
    EPOCH_DURATION_SECS, EPOCH_FRACTION_BPS, FARM_SUPPLY_PERCENT, MAX_PROJECTED_EPOCHS,
};
pub use governance::{AdminAction, CraftsmanAdmin, Ownable, TRANSFER_OWNERSHIP_TIMELOCK_SECS};
pub use ledger::{AssetBook, Ledger};
pub use pool::{DepositAsset, PoolInfo, UserPosition, ACC_PRECISION, STAKING_POOL_ID};
pub use supply::{GenesisAllocation, RewardToken};
pub use timelock::{Timelock, GRACE_PERIOD_SECS};
pub use token::{Tan, Wei, WEI_PER_TAN};
pub use workbench::Workbench;
