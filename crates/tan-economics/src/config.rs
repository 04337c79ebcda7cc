// crates/tan-economics/src/config.rs
//
// Farm configuration. Loaded from a TOML file or populated with the
// production defaults: 10,000,000 TAN max supply, 66% farmed, 1% of the
// remainder per 30-day epoch at 6-second blocks.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tan_core::address::Address;
use tan_core::error::FarmError;

use crate::craftsman::{Craftsman, CraftsmanParams};
use crate::emission::{EmissionParams, FARM_SUPPLY_PERCENT};
use crate::supply::{default_genesis, GenesisAllocation, RewardToken};
use crate::token::Tan;
use crate::workbench::Workbench;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmConfig {
    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub emission: EmissionParams,

    #[serde(default)]
    pub engine: CraftsmanParams,

    #[serde(default)]
    pub roles: RoleConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Hard supply ceiling, e.g. `"10_000_000 TAN"` or a wei integer string.
    #[serde(default = "default_max_supply")]
    pub max_supply: Tan,

    /// Share of max supply reserved for farming emission.
    #[serde(default = "default_farm_percent")]
    pub farm_percent: u8,

    /// Allocations credited at creation.
    #[serde(default = "default_genesis")]
    pub genesis: Vec<GenesisAllocation>,
}

fn default_max_supply() -> Tan {
    Tan::from_whole(10_000_000)
}

fn default_farm_percent() -> u8 {
    FARM_SUPPLY_PERCENT
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            max_supply: default_max_supply(),
            farm_percent: default_farm_percent(),
            genesis: default_genesis(),
        }
    }
}

/// Accounts holding the farm's roles. Addresses accept `0x` hex or a label
/// that is hashed into an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    #[serde(default = "default_owner")]
    pub owner: Address,
    #[serde(default = "default_dev")]
    pub dev: Address,
}

fn default_owner() -> Address {
    Address::derive("owner")
}

fn default_dev() -> Address {
    Address::derive("dev")
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            dev: default_dev(),
        }
    }
}

/// One liquidity pool in a simulation run, with a single farmer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedPool {
    pub symbol: String,
    pub weight: u64,
    /// Amount the pool's farmer deposits at the first block.
    pub deposit: Tan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of blocks to run.
    #[serde(default = "default_blocks")]
    pub blocks: u64,

    /// Farmers harvest every this many blocks.
    #[serde(default = "default_harvest_interval")]
    pub harvest_interval: u64,

    /// Stake harvested TAN into pool 0 after each harvest.
    #[serde(default = "default_compound")]
    pub compound: bool,

    /// Unix seconds of the first simulated block.
    #[serde(default)]
    pub start_timestamp: i64,

    #[serde(default = "default_pools")]
    pub pools: Vec<SimulatedPool>,
}

fn default_blocks() -> u64 {
    // Two emission epochs at the default block time.
    2 * 432_000
}

fn default_harvest_interval() -> u64 {
    14_400
}

fn default_compound() -> bool {
    true
}

fn default_pools() -> Vec<SimulatedPool> {
    vec![
        SimulatedPool {
            symbol: "TAN-ETH".to_string(),
            weight: 2000,
            deposit: Tan::from_whole(1_000),
        },
        SimulatedPool {
            symbol: "TAN-USDC".to_string(),
            weight: 1000,
            deposit: Tan::from_whole(50_000),
        },
        SimulatedPool {
            symbol: "ETH-USDC".to_string(),
            weight: 500,
            deposit: Tan::from_whole(20_000),
        },
    ]
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            blocks: default_blocks(),
            harvest_interval: default_harvest_interval(),
            compound: default_compound(),
            start_timestamp: 0,
            pools: default_pools(),
        }
    }
}

impl FarmConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// # Errors
    /// Returns `FarmError::Config` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FarmError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| FarmError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, FarmError> {
        let config: FarmConfig = toml::from_str(contents)?;
        config.emission.validate()?;
        Ok(config)
    }

    /// Stand up a token, Workbench and Craftsman wired together, with the
    /// token's epoch 0 stamped at `now`.
    pub fn build_craftsman(&self, now: i64) -> Result<Craftsman, FarmError> {
        let engine = Address::derive("craftsman");
        let token = RewardToken::new(
            Address::derive("tan"),
            engine,
            self.token.max_supply.wei,
            self.token.farm_percent,
            self.emission,
            &self.token.genesis,
            now,
        )?;
        let workbench = Workbench::new(Address::derive("workbench"), engine);
        Craftsman::new(
            engine,
            self.roles.owner,
            self.roles.dev,
            token,
            workbench,
            self.engine,
        )
    }
}
