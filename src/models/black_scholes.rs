//! Black-Scholes Model
//!
//! Provides:
//! - European option pricing with continuous dividend yield
//! - Greeks computation (delta, gamma, vega, theta, rho)
//!
//! All entry points take a validated [`OptionQuote`] and a trial volatility.
//! A non-positive or non-finite volatility is rejected, never clamped.
//!
//! At expiry (`T = 0`) the price is the intrinsic value and the Greeks take
//! their limiting forms: delta is a step function of moneyness, gamma, vega,
//! theta and rho are zero. Exactly at the strike the delta step is undefined;
//! the midpoint (±0.5) is returned instead of evaluating `0/0`.

use crate::core::{GreeksResult, IVError, IVResult, OptionQuote, OptionType};

use super::normal::{norm_cdf, norm_pdf};

/// Quantities shared by price and every Greek at one (quote, σ)
#[derive(Debug, Clone, Copy)]
struct Terms {
    sqrt_t: f64,
    /// e^(-qT)
    div_factor: f64,
    /// e^(-rT)
    df: f64,
    d1: f64,
    d2: f64,
}

impl Terms {
    /// Caller guarantees `T > 0` and `σ > 0`
    fn new(quote: &OptionQuote, vol: f64) -> Self {
        let time = quote.time_to_expiry();
        let rate = quote.risk_free_rate();
        let div = quote.dividend_yield();
        let sqrt_t = time.sqrt();
        let vol_sqrt_t = vol * sqrt_t;

        // σ²T is never formed, so any σ with finite σ√T stays finite
        let d1 = (quote.log_moneyness() + (rate - div) * time) / vol_sqrt_t + 0.5 * vol_sqrt_t;

        Self {
            sqrt_t,
            div_factor: (-div * time).exp(),
            df: (-rate * time).exp(),
            d1,
            d2: d1 - vol_sqrt_t,
        }
    }

    fn price(&self, quote: &OptionQuote) -> f64 {
        let spot = quote.underlying_price();
        let strike = quote.strike_price();
        match quote.option_type() {
            OptionType::Call => {
                spot * self.div_factor * norm_cdf(self.d1) - strike * self.df * norm_cdf(self.d2)
            }
            OptionType::Put => {
                strike * self.df * norm_cdf(-self.d2) - spot * self.div_factor * norm_cdf(-self.d1)
            }
        }
    }

    /// Raw vega, dV/dσ
    fn vega(&self, quote: &OptionQuote) -> f64 {
        quote.underlying_price() * self.div_factor * norm_pdf(self.d1) * self.sqrt_t
    }
}

fn check_vol(quote: &OptionQuote, vol: f64) -> IVResult<()> {
    if !(vol.is_finite() && vol > 0.0) {
        return Err(IVError::invalid_input(format!(
            "volatility must be positive and finite, got {}",
            vol
        )));
    }
    if !(vol * quote.time_to_expiry().sqrt()).is_finite() {
        return Err(IVError::invalid_input(format!(
            "total volatility overflows for sigma {} and T {}",
            vol,
            quote.time_to_expiry()
        )));
    }
    Ok(())
}

/// Black-Scholes d1 and d2
///
/// Undefined at expiry, so `T = 0` is rejected with `InvalidInput`.
pub fn d1_d2(quote: &OptionQuote, vol: f64) -> IVResult<(f64, f64)> {
    check_vol(quote, vol)?;
    if quote.time_to_expiry() == 0.0 {
        return Err(IVError::invalid_input("d1/d2 are undefined at expiry (T = 0)"));
    }
    let terms = Terms::new(quote, vol);
    Ok((terms.d1, terms.d2))
}

/// Black-Scholes European option price
pub fn price(quote: &OptionQuote, vol: f64) -> IVResult<f64> {
    check_vol(quote, vol)?;
    if quote.time_to_expiry() == 0.0 {
        return Ok(quote.intrinsic());
    }
    Ok(Terms::new(quote, vol).price(quote))
}

/// Raw vega (per unit volatility); zero at expiry
pub fn vega(quote: &OptionQuote, vol: f64) -> IVResult<f64> {
    check_vol(quote, vol)?;
    if quote.time_to_expiry() == 0.0 {
        return Ok(0.0);
    }
    Ok(Terms::new(quote, vol).vega(quote))
}

/// Price and raw vega in one pass, for root finding
///
/// Caller guarantees `T > 0` and a positive finite `vol`.
pub(crate) fn price_and_vega(quote: &OptionQuote, vol: f64) -> (f64, f64) {
    let terms = Terms::new(quote, vol);
    (terms.price(quote), terms.vega(quote))
}

/// Black-Scholes Greeks
pub fn greeks(quote: &OptionQuote, vol: f64) -> IVResult<GreeksResult> {
    check_vol(quote, vol)?;
    if quote.time_to_expiry() == 0.0 {
        return Ok(expiry_greeks(quote));
    }

    let spot = quote.underlying_price();
    let strike = quote.strike_price();
    let rate = quote.risk_free_rate();
    let div = quote.dividend_yield();
    let time = quote.time_to_expiry();

    let t = Terms::new(quote, vol);
    let pdf_d1 = norm_pdf(t.d1);

    // Delta
    let delta = match quote.option_type() {
        OptionType::Call => t.div_factor * norm_cdf(t.d1),
        OptionType::Put => t.div_factor * (norm_cdf(t.d1) - 1.0),
    };

    // Gamma (same for call and put)
    let gamma = t.div_factor * pdf_d1 / (spot * vol * t.sqrt_t);

    // Theta (per year)
    let term1 = -spot * pdf_d1 * vol * t.div_factor / (2.0 * t.sqrt_t);
    let theta = match quote.option_type() {
        OptionType::Call => {
            term1 - rate * strike * t.df * norm_cdf(t.d2) + div * spot * t.div_factor * norm_cdf(t.d1)
        }
        OptionType::Put => {
            term1 + rate * strike * t.df * norm_cdf(-t.d2)
                - div * spot * t.div_factor * norm_cdf(-t.d1)
        }
    };

    // Rho (per unit rate)
    let rho = match quote.option_type() {
        OptionType::Call => strike * time * t.df * norm_cdf(t.d2),
        OptionType::Put => -strike * time * t.df * norm_cdf(-t.d2),
    };

    Ok(GreeksResult {
        price: t.price(quote),
        delta,
        gamma,
        vega: t.vega(quote),
        theta,
        rho,
    })
}

/// Limiting Greeks at T = 0
fn expiry_greeks(quote: &OptionQuote) -> GreeksResult {
    let spot = quote.underlying_price();
    let strike = quote.strike_price();

    let delta = if spot == strike {
        0.5 * quote.option_type().phi()
    } else {
        match quote.option_type() {
            OptionType::Call => if spot > strike { 1.0 } else { 0.0 },
            OptionType::Put => if spot < strike { -1.0 } else { 0.0 },
        }
    };

    GreeksResult {
        price: quote.intrinsic(),
        delta,
        ..Default::default()
    }
}
