//! Option quote data
//!
//! A validated, immutable snapshot of the market inputs for one European option.
//! Construction is the only place inputs are checked; everything downstream
//! (pricer, solver, analysis) trusts a quote it receives.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{ensure_finite, ensure_positive, IVError, IVResult};
use super::option::{year_fraction, OptionType};

/// Option market quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOptionQuote", into = "RawOptionQuote")]
pub struct OptionQuote {
    underlying_price: f64,
    strike_price: f64,
    market_price: f64,
    time_to_expiry: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
    option_type: OptionType,
}

/// Unchecked wire form of [`OptionQuote`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawOptionQuote {
    underlying_price: f64,
    strike_price: f64,
    market_price: f64,
    time_to_expiry: f64,
    risk_free_rate: f64,
    #[serde(default)]
    dividend_yield: f64,
    option_type: OptionType,
}

impl TryFrom<RawOptionQuote> for OptionQuote {
    type Error = IVError;

    fn try_from(raw: RawOptionQuote) -> Result<Self, Self::Error> {
        OptionQuote::new(
            raw.underlying_price,
            raw.strike_price,
            raw.market_price,
            raw.time_to_expiry,
            raw.risk_free_rate,
            raw.dividend_yield,
            raw.option_type,
        )
    }
}

impl From<OptionQuote> for RawOptionQuote {
    fn from(q: OptionQuote) -> Self {
        Self {
            underlying_price: q.underlying_price,
            strike_price: q.strike_price,
            market_price: q.market_price,
            time_to_expiry: q.time_to_expiry,
            risk_free_rate: q.risk_free_rate,
            dividend_yield: q.dividend_yield,
            option_type: q.option_type,
        }
    }
}

impl OptionQuote {
    /// Create a validated quote
    ///
    /// Fails with `InvalidInput` unless spot, strike and market price are
    /// positive, time to expiry is non-negative, and every field is finite.
    /// Rates may be negative.
    pub fn new(
        underlying_price: f64,
        strike_price: f64,
        market_price: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
        option_type: OptionType,
    ) -> IVResult<Self> {
        ensure_positive("underlying price", underlying_price)?;
        ensure_positive("strike price", strike_price)?;
        ensure_positive("market price", market_price)?;
        ensure_finite("time to expiry", time_to_expiry)?;
        if time_to_expiry < 0.0 {
            return Err(IVError::invalid_input(format!(
                "time to expiry must be non-negative, got {}",
                time_to_expiry
            )));
        }
        ensure_finite("risk-free rate", risk_free_rate)?;
        ensure_finite("dividend yield", dividend_yield)?;

        Ok(Self {
            underlying_price,
            strike_price,
            market_price,
            time_to_expiry,
            risk_free_rate,
            dividend_yield,
            option_type,
        })
    }

    /// Create a quote from trade and expiry dates (Act/365 fixed)
    #[allow(clippy::too_many_arguments)]
    pub fn from_dates(
        underlying_price: f64,
        strike_price: f64,
        market_price: f64,
        trade_date: NaiveDate,
        expiry: NaiveDate,
        risk_free_rate: f64,
        dividend_yield: f64,
        option_type: OptionType,
    ) -> IVResult<Self> {
        let time = year_fraction(trade_date, expiry)?;
        Self::new(
            underlying_price,
            strike_price,
            market_price,
            time,
            risk_free_rate,
            dividend_yield,
            option_type,
        )
    }

    /// Same contract and market, different observed premium
    pub fn with_market_price(&self, market_price: f64) -> IVResult<Self> {
        ensure_positive("market price", market_price)?;
        Ok(Self {
            market_price,
            ..*self
        })
    }

    pub fn underlying_price(&self) -> f64 {
        self.underlying_price
    }

    pub fn strike_price(&self) -> f64 {
        self.strike_price
    }

    pub fn market_price(&self) -> f64 {
        self.market_price
    }

    /// Time to expiry in years
    pub fn time_to_expiry(&self) -> f64 {
        self.time_to_expiry
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Spot moneyness: S/K
    pub fn moneyness(&self) -> f64 {
        self.underlying_price / self.strike_price
    }

    /// Log-moneyness: ln(S/K)
    pub fn log_moneyness(&self) -> f64 {
        self.moneyness().ln()
    }

    /// Forward price: S * exp((r - q) * T)
    pub fn forward(&self) -> f64 {
        self.underlying_price
            * ((self.risk_free_rate - self.dividend_yield) * self.time_to_expiry).exp()
    }

    /// Intrinsic value at spot
    pub fn intrinsic(&self) -> f64 {
        self.option_type
            .intrinsic(self.underlying_price, self.strike_price)
    }

    /// Is this option in the money?
    pub fn is_itm(&self) -> bool {
        self.intrinsic() > 0.0
    }
}
