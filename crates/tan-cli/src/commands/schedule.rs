// crates/tan-cli/src/commands/schedule.rs
//
// `tan schedule` — project the emission schedule.
//
// Each row assumes the previous epoch's supply was minted in full, which is
// the upper bound on how fast the farm supply drains.

use std::path::PathBuf;

use chrono::DateTime;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tan_core::FarmError;
use tan_economics::{project, EpochUpdate, FarmConfig, Tan};

use crate::output::{format_json, format_table, OutputFormat};

/// Emission schedule projection command.
#[derive(Debug, Args)]
pub struct ScheduleCmd {
    /// Number of epochs to project.
    #[arg(long, default_value = "12")]
    pub epochs: u64,

    /// Farm configuration file (TOML). Defaults are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Unix seconds at which epoch 0 starts. Defaults to now.
    #[arg(long)]
    pub start: Option<i64>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// A row in the schedule table.
#[derive(Debug, Tabled, Serialize)]
struct ScheduleRow {
    #[tabled(rename = "Epoch")]
    epoch: u64,
    #[tabled(rename = "Starts")]
    starts: String,
    #[tabled(rename = "Circulating")]
    circulating: Tan,
    #[tabled(rename = "Remaining")]
    remaining: Tan,
    #[tabled(rename = "Per Epoch")]
    per_epoch: Tan,
    #[tabled(rename = "Per Block")]
    per_block: Tan,
}

impl From<&EpochUpdate> for ScheduleRow {
    fn from(update: &EpochUpdate) -> Self {
        Self {
            epoch: update.epoch,
            starts: format_timestamp(update.timestamp),
            circulating: Tan::from_wei(update.circulating_supply),
            remaining: Tan::from_wei(update.remaining),
            per_epoch: Tan::from_wei(update.supply_per_epoch),
            per_block: Tan::from_wei(update.supply_per_block),
        }
    }
}

fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Farm supply the configuration yields.
fn farm_supply(config: &FarmConfig) -> Result<u128, FarmError> {
    tan_economics::math::mul_div(
        config.token.max_supply.wei,
        config.token.farm_percent as u128,
        100,
    )
}

fn rows(config: &FarmConfig, start: i64, epochs: u64) -> Result<Vec<ScheduleRow>, FarmError> {
    let updates = project(farm_supply(config)?, &config.emission, start, epochs)?;
    Ok(updates.iter().map(ScheduleRow::from).collect())
}

/// Run the schedule command.
pub fn run(cmd: &ScheduleCmd) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(cmd.config.as_ref())?;
    let start = cmd.start.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let rows = rows(&config, start, cmd.epochs)?;

    match OutputFormat::from_json_flag(cmd.json) {
        OutputFormat::Json => println!("{}", format_json(&rows)),
        OutputFormat::Table => {
            println!(
                "Max supply: {}  |  Farm supply: {}  |  Epoch: {} days",
                config.token.max_supply,
                Tan::from_wei(farm_supply(&config)?),
                config.emission.epoch_duration_secs / 86_400
            );
            println!();
            println!("{}", format_table(&rows));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_the_decay() {
        let mut config = FarmConfig::default();
        config.token.max_supply = Tan::from_wei(65_454_545_455);

        let rows = rows(&config, 0, 3).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].epoch, 0);
        assert_eq!(rows[0].per_block, Tan::from_wei(1000));
        assert_eq!(rows[0].per_epoch, Tan::from_wei(432_000_000));
        // Epoch 1 prices off the 42,768,000,000 left after epoch 0.
        assert_eq!(rows[1].circulating, Tan::from_wei(432_000_000));
        assert_eq!(rows[1].per_epoch, Tan::from_wei(427_680_000));
        assert_eq!(rows[1].starts, "1970-01-31 00:00");
        assert!(rows[2].per_block < rows[1].per_block);
    }

    #[test]
    fn test_zero_epochs_is_empty() {
        assert!(rows(&FarmConfig::default(), 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_oversized_projection_is_an_error() {
        assert!(matches!(
            rows(&FarmConfig::default(), 0, u64::MAX),
            Err(FarmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_json_rows() {
        let rows = rows(&FarmConfig::default(), 0, 1).unwrap();
        let json = format_json(&rows);
        assert!(json.contains("\"per_block\""));
        assert!(json.contains("\"starts\": \"1970-01-01 00:00\""));
    }
}
