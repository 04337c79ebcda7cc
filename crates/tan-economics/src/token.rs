// crates/tan-economics/src/token.rs
//
// TAN token amount type and unit constants.
//
// The smallest unit of TAN is the "wei". 1 TAN = 10^18 wei. All internal
// accounting uses wei in u128 to avoid floating-point precision issues.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tan_core::error::FarmError;

/// Number of decimal places of TAN.
pub const DECIMALS: u32 = 18;

/// Number of wei in one TAN. 1 TAN = 10^18 wei.
pub const WEI_PER_TAN: u128 = 1_000_000_000_000_000_000;

/// Token symbol.
pub const SYMBOL: &str = "TAN";

/// Type alias for wei — the smallest unit of TAN.
pub type Wei = u128;

/// A TAN amount.
///
/// Wraps an amount in wei. Parses from either a plain wei integer
/// (`"152777777777777777"`) or a decimal TAN figure with the symbol
/// (`"1.5 TAN"`, `"10000000 TAN"`), which is what configuration files use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tan {
    pub wei: u128,
}

impl Tan {
    /// Create an amount from a whole number of TAN.
    ///
    /// # Example
    /// ```
    /// use tan_economics::token::{Tan, WEI_PER_TAN};
    /// assert_eq!(Tan::from_whole(3).wei, 3 * WEI_PER_TAN);
    /// ```
    pub fn from_whole(tan: u64) -> Self {
        Self {
            wei: tan as u128 * WEI_PER_TAN,
        }
    }

    pub fn from_wei(wei: u128) -> Self {
        Self { wei }
    }

    pub fn zero() -> Self {
        Self { wei: 0 }
    }
}

impl Add for Tan {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            wei: self.wei.saturating_add(rhs.wei),
        }
    }
}

impl Sub for Tan {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            wei: self.wei.saturating_sub(rhs.wei),
        }
    }
}

impl fmt::Display for Tan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.wei / WEI_PER_TAN;
        let frac = self.wei % WEI_PER_TAN;
        if frac == 0 {
            write!(f, "{} {}", whole, SYMBOL)
        } else {
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} {}", whole, trimmed, SYMBOL)
        }
    }
}

impl FromStr for Tan {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().replace('_', "");
        let invalid = || FarmError::InvalidParameter(format!("Invalid TAN amount: {}", s));

        let Some(figure) = text.strip_suffix(SYMBOL) else {
            let wei = text.parse::<u128>().map_err(|_| invalid())?;
            return Ok(Self { wei });
        };

        let figure = figure.trim();
        let (whole, frac) = figure.split_once('.').unwrap_or((figure, ""));
        if frac.len() > DECIMALS as usize || (whole.is_empty() && frac.is_empty()) {
            return Err(invalid());
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_wei: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
            padded.parse().map_err(|_| invalid())?
        };
        let wei = whole
            .checked_mul(WEI_PER_TAN)
            .and_then(|w| w.checked_add(frac_wei))
            .ok_or_else(invalid)?;
        Ok(Self { wei })
    }
}

impl Serialize for Tan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.wei)
    }
}

impl<'de> Deserialize<'de> for Tan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(wei) => Ok(Tan::from_wei(wei as u128)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}
