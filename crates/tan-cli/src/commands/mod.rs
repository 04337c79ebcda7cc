// crates/tan-cli/src/commands/mod.rs
//
// Command module declarations for the TAN CLI.

pub mod schedule;
pub mod simulate;

use std::path::PathBuf;

use tan_economics::FarmConfig;

/// Load the configuration at `path`, or the built-in defaults when none is
/// given.
pub(crate) fn load_config(path: Option<&PathBuf>) -> Result<FarmConfig, tan_core::FarmError> {
    match path {
        Some(path) => FarmConfig::load(path),
        None => Ok(FarmConfig::default()),
    }
}
