// crates/tan-cli/src/commands/simulate.rs
//
// `tan simulate` — drive a Craftsman through a deterministic farming run.
//
// One farmer per configured pool deposits at the start block, harvests every
// `harvest_interval` blocks and optionally compounds the harvest into the
// staking pool. The owner advances the emission epoch whenever the schedule
// allows it. Block timestamps follow the configured block time.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tan_core::{Address, CallContext, FarmError, FungibleLedger};
use tan_economics::{Craftsman, FarmConfig, Ledger, Tan, STAKING_POOL_ID};
use tracing::{debug, info};

use crate::output::{format_json, format_table, OutputFormat};

/// Farm simulation command.
#[derive(Debug, Args)]
pub struct SimulateCmd {
    /// Farm configuration file (TOML). Defaults are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the number of simulated blocks.
    #[arg(long)]
    pub blocks: Option<u64>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Per-pool outcome of a run.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PoolReport {
    #[tabled(rename = "PID")]
    pub pid: usize,
    #[tabled(rename = "Asset")]
    pub asset: String,
    #[tabled(rename = "Weight")]
    pub weight: u64,
    #[tabled(rename = "Share")]
    pub share: String,
    #[tabled(rename = "Deposited")]
    pub deposited: Tan,
    #[tabled(rename = "Harvested")]
    pub harvested: Tan,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub blocks: u64,
    pub epochs_advanced: u64,
    pub emission_rate: Tan,
    pub circulating_supply: Tan,
    pub dev_balance: Tan,
    pub vault_balance: Tan,
    pub pools: Vec<PoolReport>,
}

struct Farmer {
    address: Address,
    pid: usize,
}

/// Run the simulation described by `config`.
pub fn simulate(config: &FarmConfig) -> Result<SimulationReport, FarmError> {
    let sim = &config.simulation;
    if sim.harvest_interval == 0 {
        return Err(FarmError::Config(
            "simulation.harvest_interval must be positive".to_string(),
        ));
    }

    let owner = config.roles.owner;
    let start_block = config.engine.start_block;
    let block_time = config.emission.block_time_secs as i64;
    let timestamp_at =
        |block: u64| sim.start_timestamp + (block - start_block) as i64 * block_time;

    let mut craft = config.build_craftsman(sim.start_timestamp)?;
    let setup = CallContext::new(owner, start_block, sim.start_timestamp);
    let mut farmers = Vec::with_capacity(sim.pools.len());

    for pool in &sim.pools {
        let farmer = Address::derive(&format!("farmer:{}", pool.symbol));
        let label = format!("asset:{}", pool.symbol);
        let mut ledger = Ledger::new(Address::derive(&label), pool.symbol.clone());
        ledger.issue(&farmer, pool.deposit.wei)?;
        let asset = craft.register_asset(ledger)?;
        let pid = craft.add_pool(&setup, pool.weight, asset)?;

        let engine = craft.address();
        craft.asset_mut(&asset)?.approve(&farmer, &engine, pool.deposit.wei);
        craft.deposit(&setup.with_sender(farmer), pid, pool.deposit.wei)?;
        farmers.push(Farmer {
            address: farmer,
            pid,
        });
    }

    let mut harvested = vec![0u128; craft.pool_count()];
    let mut epochs_advanced = 0;
    let end_block = start_block.saturating_add(sim.blocks);
    let mut block = start_block;

    while block < end_block {
        block = block.saturating_add(sim.harvest_interval).min(end_block);
        let now = timestamp_at(block);

        if craft.reward_token().schedule().is_ready(now) {
            let update = craft.advance_epoch(&CallContext::new(owner, block, now))?;
            epochs_advanced += 1;
            info!(
                epoch = update.epoch,
                block,
                supply_per_block = update.supply_per_block,
                "Epoch advanced"
            );
        }

        for farmer in &farmers {
            let call = CallContext::new(farmer.address, block, now);
            let reward = craft.deposit(&call, farmer.pid, 0)?.reward_paid;
            harvested[farmer.pid] += reward;
            if sim.compound && reward > 0 {
                let engine = craft.address();
                craft
                    .reward_token_mut()
                    .approve(&farmer.address, &engine, reward);
                let staked = craft.enter_staking(&call, reward)?;
                harvested[STAKING_POOL_ID] += staked.reward_paid;
            }
            debug!(block, pid = farmer.pid, reward, "Harvest");
        }
    }

    Ok(report(&craft, config, sim.blocks, epochs_advanced, &harvested))
}

fn report(
    craft: &Craftsman,
    config: &FarmConfig,
    blocks: u64,
    epochs_advanced: u64,
    harvested: &[u128],
) -> SimulationReport {
    let total_weight = craft.total_weight();
    let pools = craft
        .pools()
        .iter()
        .enumerate()
        .map(|(pid, pool)| {
            let asset = if pid == STAKING_POOL_ID {
                "TAN (staking)".to_string()
            } else {
                config
                    .simulation
                    .pools
                    .get(pid - 1)
                    .map(|p| p.symbol.clone())
                    .unwrap_or_default()
            };
            let share = if total_weight == 0 {
                0.0
            } else {
                pool.weight as f64 * 100.0 / total_weight as f64
            };
            PoolReport {
                pid,
                asset,
                weight: pool.weight,
                share: format!("{:.2}%", share),
                deposited: Tan::from_wei(pool.total_deposited),
                harvested: Tan::from_wei(harvested.get(pid).copied().unwrap_or(0)),
            }
        })
        .collect();

    let token = craft.reward_token();
    SimulationReport {
        blocks,
        epochs_advanced,
        emission_rate: Tan::from_wei(craft.emission_rate()),
        circulating_supply: Tan::from_wei(craft.circulating_supply()),
        dev_balance: Tan::from_wei(token.balance_of(&craft.dev_address())),
        vault_balance: Tan::from_wei(token.balance_of(&craft.workbench().address())),
        pools,
    }
}

/// Run the simulate command.
pub fn run(cmd: &SimulateCmd) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(cmd.config.as_ref())?;
    if let Some(blocks) = cmd.blocks {
        config.simulation.blocks = blocks;
    }

    let report = simulate(&config)?;

    match OutputFormat::from_json_flag(cmd.json) {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            println!(
                "Blocks: {}  |  Epochs advanced: {}  |  Emission: {} per block",
                report.blocks, report.epochs_advanced, report.emission_rate
            );
            println!(
                "Circulating: {}  |  Dev: {}  |  Vault dust: {}",
                report.circulating_supply, report.dev_balance, report.vault_balance
            );
            println!();
            println!("{}", format_table(&report.pools));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tan_economics::SimulatedPool;

    fn small_config(compound: bool) -> FarmConfig {
        let mut config = FarmConfig::default();
        config.token.max_supply = Tan::from_wei(65_454_545_455);
        config.token.genesis = Vec::new();
        config.simulation.blocks = 100;
        config.simulation.harvest_interval = 10;
        config.simulation.compound = compound;
        config.simulation.pools = ["LP1", "LP2", "LP3"]
            .iter()
            .map(|symbol| SimulatedPool {
                symbol: symbol.to_string(),
                weight: 1000,
                deposit: Tan::from_wei(100),
            })
            .collect();
        config
    }

    #[test]
    fn test_harvests_split_by_weight() {
        let report = simulate(&small_config(false)).unwrap();

        assert_eq!(report.pools.len(), 4);
        assert_eq!(report.pools[0].weight, 1000);
        assert_eq!(report.pools[0].share, "25.00%");
        for pool in &report.pools[1..] {
            assert_eq!(pool.harvested, Tan::from_wei(25_000));
            assert_eq!(pool.deposited, Tan::from_wei(100));
        }
        assert_eq!(report.pools[0].harvested, Tan::zero());
        // The empty staking pool mints nothing; dev takes a tenth on top.
        assert_eq!(report.circulating_supply, Tan::from_wei(82_500));
        assert_eq!(report.dev_balance, Tan::from_wei(7_500));
        assert_eq!(report.vault_balance, Tan::zero());
        assert_eq!(report.epochs_advanced, 0);
    }

    #[test]
    fn test_compounding_fills_staking_pool() {
        let report = simulate(&small_config(true)).unwrap();

        assert!(report.pools[0].deposited > Tan::zero());
        assert!(report.pools[0].harvested > Tan::zero());
        assert!(report.circulating_supply > Tan::from_wei(82_500));
    }

    #[test]
    fn test_default_run_advances_two_epochs() {
        let report = simulate(&FarmConfig::default()).unwrap();
        assert_eq!(report.epochs_advanced, 2);
        assert!(report.circulating_supply.wei <= FarmConfig::default().token.max_supply.wei);
    }

    #[test]
    fn test_symbols_do_not_collide_with_role_accounts() {
        let mut config = small_config(false);
        let symbols = ["tan", "craftsman", "workbench"];
        for (pool, symbol) in config.simulation.pools.iter_mut().zip(symbols) {
            pool.symbol = symbol.to_string();
        }
        let report = simulate(&config).unwrap();
        assert_eq!(report.pools[1].asset, "tan");
        assert_eq!(report.pools[1].harvested, Tan::from_wei(25_000));
    }

    #[test]
    fn test_zero_harvest_interval_rejected() {
        let mut config = small_config(false);
        config.simulation.harvest_interval = 0;
        assert!(matches!(simulate(&config), Err(FarmError::Config(_))));
    }
}
