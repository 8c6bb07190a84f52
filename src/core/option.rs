//! Option type and day-count helpers
//!
//! European exercise only; the model never looks at an exercise style.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{IVError, IVResult};

/// Days per year for the Act/365 fixed convention
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Parses exchange codes as well as plain names (`CE`/`PE`, `C`/`P`, `call`/`put`)
impl FromStr for OptionType {
    type Err = IVError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" | "CE" | "CALL" => Ok(OptionType::Call),
            "P" | "PE" | "PUT" => Ok(OptionType::Put),
            other => Err(IVError::invalid_input(format!("unknown option type '{}'", other))),
        }
    }
}

/// Year fraction between trade and expiry dates, Act/365 fixed
pub fn year_fraction(trade_date: NaiveDate, expiry: NaiveDate) -> IVResult<f64> {
    let days = (expiry - trade_date).num_days();
    if days < 0 {
        return Err(IVError::invalid_input(format!(
            "expiry {} precedes trade date {}",
            expiry, trade_date
        )));
    }
    Ok(days as f64 / DAYS_PER_YEAR)
}
