//! Implied volatility solver
//!
//! Inverts the Black-Scholes price in σ with a safeguarded Newton-Raphson
//! iteration:
//! 1. Reject prices outside the no-arbitrage band before iterating.
//! 2. Confirm the root lies inside the configured volatility bracket.
//! 3. Take Newton steps on raw vega while they stay strictly inside the
//!    current bracket; otherwise bisect. Every evaluation tightens the bracket
//!    using the sign of the residual, since price is increasing in σ.
//! 4. Stop on price tolerance or σ step tolerance, or fail at the iteration cap.
//!
//! Each call is a single deterministic pass with no state carried between calls.

use serde::{Deserialize, Serialize};

use crate::core::{IVError, IVResult, OptionQuote, OptionType, SolverConfig};

use super::black_scholes::price_and_vega;

/// A converged implied volatility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IVSolution {
    /// Implied volatility
    pub sigma: f64,
    /// Loop iterations used (pricer evaluations inside the loop)
    pub iterations: u32,
    /// Signed residual BS(σ) - market price at `sigma`
    pub residual: f64,
    /// Vega at `sigma`, scaled per `SolverConfig::vega_scaling`
    pub vega: f64,
    /// Iterations that advanced by a Newton step
    pub newton_steps: u32,
    /// Iterations that fell back to bisection
    pub bisection_steps: u32,
}

/// `Ok` is the converged outcome; every failure is an [`IVError`]
pub type IVSolveResult = IVResult<IVSolution>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Newton,
    Bisection,
}

/// Price band attainable for some σ > 0
///
/// Call: `(max(S·e^(−qT) − K·e^(−rT), 0), S·e^(−qT))`.
/// Put: `(max(K·e^(−rT) − S·e^(−qT), 0), K·e^(−rT))`.
/// Both ends are limits (σ → 0 and σ → ∞), so the feasible set is open.
pub fn no_arbitrage_bounds(quote: &OptionQuote) -> (f64, f64) {
    let time = quote.time_to_expiry();
    let spot = quote.underlying_price() * (-quote.dividend_yield() * time).exp();
    let strike = quote.strike_price() * (-quote.risk_free_rate() * time).exp();

    match quote.option_type() {
        OptionType::Call => ((spot - strike).max(0.0), spot),
        OptionType::Put => ((strike - spot).max(0.0), strike),
    }
}

/// Starting point for the iteration, clamped into the configured bracket
///
/// Takes the larger of the Brenner-Subrahmanyam estimate on time value and
/// the inflection point `sqrt(2|ln(F/K)| / T)` of price in σ. From the
/// inflection point Newton approaches the root monotonically, which matters
/// for deep ITM/OTM quotes where the ATM estimate is tiny.
pub fn initial_guess(quote: &OptionQuote, config: &SolverConfig) -> f64 {
    let time = quote.time_to_expiry();
    if time <= 0.0 {
        return config.sigma_min;
    }

    let (lower, _) = no_arbitrage_bounds(quote);
    let discounted_spot = quote.underlying_price() * (-quote.dividend_yield() * time).exp();
    let time_value = (quote.market_price() - lower).max(0.0);

    let atm = (2.0 * std::f64::consts::PI / time).sqrt() * time_value / discounted_spot;
    let inflection = (2.0 * (quote.forward() / quote.strike_price()).ln().abs() / time).sqrt();

    atm.max(inflection).clamp(config.sigma_min, config.sigma_max)
}

/// Solve for σ such that the Black-Scholes price matches the quote's market price
pub fn implied_volatility(quote: &OptionQuote, config: &SolverConfig) -> IVSolveResult {
    config.validate()?;

    let market = quote.market_price();

    if quote.time_to_expiry() == 0.0 {
        return solve_at_expiry(quote, config);
    }

    let (lower, upper) = no_arbitrage_bounds(quote);
    if market <= lower || market >= upper {
        tracing::debug!(
            market,
            lower,
            upper,
            "market price outside no-arbitrage band"
        );
        return Err(IVError::NoArbitrageViolation {
            market_price: market,
            lower,
            upper,
        });
    }

    let (sigma_min, sigma_max) = config.sigma_bracket();
    let (price_at_min, _) = price_and_vega(quote, sigma_min);
    let (price_at_max, _) = price_and_vega(quote, sigma_max);
    if price_at_min - market > config.price_tolerance
        || market - price_at_max > config.price_tolerance
    {
        tracing::debug!(
            market,
            price_at_min,
            price_at_max,
            "implied volatility outside configured bracket"
        );
        return Err(IVError::OutsideBracket {
            market_price: market,
            sigma_min,
            sigma_max,
            price_at_min,
            price_at_max,
        });
    }

    let mut low = sigma_min;
    let mut high = sigma_max;
    let mut sigma = initial_guess(quote, config);
    let mut residual = f64::NAN;
    let mut max_vega: f64 = 0.0;
    let mut newton_steps = 0;
    let mut bisection_steps = 0;

    for iteration in 1..=config.max_iterations {
        let (model, vega) = price_and_vega(quote, sigma);
        residual = model - market;
        max_vega = max_vega.max(vega);

        if residual.abs() < config.price_tolerance {
            tracing::debug!(sigma, iteration, residual, "implied volatility converged on price");
            return Ok(IVSolution {
                sigma,
                iterations: iteration,
                residual,
                vega: config.vega_scaling.apply(vega),
                newton_steps,
                bisection_steps,
            });
        }

        if residual > 0.0 {
            high = sigma;
        } else {
            low = sigma;
        }

        let (next, step) = next_sigma(sigma, residual, vega, low, high, config.vega_floor);
        match step {
            Step::Newton => newton_steps += 1,
            Step::Bisection => bisection_steps += 1,
        }
        tracing::trace!(iteration, sigma, residual, vega, ?step, next, "iv iteration");

        if (next - sigma).abs() < config.sigma_tolerance {
            let (model, vega) = price_and_vega(quote, next);
            tracing::debug!(sigma = next, iteration, "implied volatility converged on sigma step");
            return Ok(IVSolution {
                sigma: next,
                iterations: iteration,
                residual: model - market,
                vega: config.vega_scaling.apply(vega),
                newton_steps,
                bisection_steps,
            });
        }

        sigma = next;
    }

    if max_vega <= config.vega_floor {
        tracing::debug!(max_vega, "vega below floor on every iteration");
        return Err(IVError::VegaDegenerate {
            iterations: config.max_iterations,
            max_vega,
        });
    }

    tracing::debug!(sigma, residual, "iteration cap reached");
    Err(IVError::ConvergenceFailure {
        iterations: config.max_iterations,
        sigma,
        residual,
    })
}

/// Newton step if vega is usable and the step stays inside `(low, high)`, else bisection
fn next_sigma(sigma: f64, residual: f64, vega: f64, low: f64, high: f64, vega_floor: f64) -> (f64, Step) {
    if vega > vega_floor {
        let candidate = sigma - residual / vega;
        if candidate > low && candidate < high {
            return (candidate, Step::Newton);
        }
    }
    (0.5 * (low + high), Step::Bisection)
}

/// At T = 0 price is intrinsic for every σ: either no σ fits or every σ does
fn solve_at_expiry(quote: &OptionQuote, config: &SolverConfig) -> IVSolveResult {
    let intrinsic = quote.intrinsic();
    let market = quote.market_price();

    if (market - intrinsic).abs() < config.price_tolerance {
        tracing::debug!(market, "expired quote at intrinsic, volatility undetermined");
        Err(IVError::VegaDegenerate {
            iterations: 0,
            max_vega: 0.0,
        })
    } else {
        Err(IVError::NoArbitrageViolation {
            market_price: market,
            lower: intrinsic,
            upper: intrinsic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FailureKind, VegaScaling};
    use crate::models::black_scholes::{price, vega};

    fn quote(
        spot: f64,
        strike: f64,
        market: f64,
        time: f64,
        rate: f64,
        div: f64,
        option_type: OptionType,
    ) -> OptionQuote {
        OptionQuote::new(spot, strike, market, time, rate, div, option_type).unwrap()
    }

    /// Quote priced at `vol`, so the solver should recover `vol`
    fn priced_quote(
        spot: f64,
        strike: f64,
        time: f64,
        rate: f64,
        div: f64,
        vol: f64,
        option_type: OptionType,
    ) -> OptionQuote {
        let template = quote(spot, strike, 1.0, time, rate, div, option_type);
        let market = price(&template, vol).unwrap();
        template.with_market_price(market).unwrap()
    }

    #[test]
    fn test_implied_vol() {
        let q = priced_quote(100.0, 100.0, 0.5, 0.05, 0.0, 0.25, OptionType::Call);
        let sol = implied_volatility(&q, &SolverConfig::default()).unwrap();

        assert!((sol.sigma - 0.25).abs() < 1e-6);
        assert!(sol.residual.abs() < 1e-6);
        assert!(sol.iterations <= 10);
    }

    #[test]
    fn test_iv_otm() {
        // OTM put
        let q = priced_quote(100.0, 90.0, 0.25, 0.05, 0.01, 0.30, OptionType::Put);
        let sol = implied_volatility(&q, &SolverConfig::precise()).unwrap();

        assert!((sol.sigma - 0.30).abs() < 1e-8);
    }

    #[test]
    fn test_index_fixture() {
        let q = quote(3500.0, 3500.0, 85.0, 0.0833, 0.06, 0.0, OptionType::Call);
        let config = SolverConfig::default();
        let sol = implied_volatility(&q, &config).unwrap();

        assert!((sol.sigma - 0.188_974_538_236_86).abs() < 1e-6);
        assert!(sol.residual.abs() < config.price_tolerance);
        assert!(sol.newton_steps >= 1);
    }

    #[test]
    fn test_deep_moneyness() {
        let config = SolverConfig::precise();
        let cases = [
            (100.0, 150.0, 0.25, 0.6, OptionType::Call),
            (100.0, 60.0, 0.25, 0.6, OptionType::Put),
            (150.0, 100.0, 0.5, 0.3, OptionType::Call),
        ];
        for (spot, strike, time, vol, option_type) in cases {
            let q = priced_quote(spot, strike, time, 0.03, 0.0, vol, option_type);
            let sol = implied_volatility(&q, &config).unwrap();
            assert!(
                (sol.sigma - vol).abs() < 1e-7,
                "K={} {:?}: got {}",
                strike,
                option_type,
                sol.sigma
            );
        }
    }

    #[test]
    fn test_no_arbitrage_violation() {
        let q = quote(100.0, 100.0, 200.0, 1.0, 0.05, 0.0, OptionType::Call);
        let err = implied_volatility(&q, &SolverConfig::default()).unwrap_err();
        match err {
            IVError::NoArbitrageViolation { upper, .. } => assert_eq!(upper, 100.0),
            other => panic!("unexpected {:?}", other),
        }

        // Below intrinsic forward value
        let q = quote(120.0, 100.0, 15.0, 1.0, 0.05, 0.0, OptionType::Call);
        let err = implied_volatility(&q, &SolverConfig::default()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoArbitrageViolation);

        // Put above discounted strike
        let q = quote(100.0, 100.0, 99.0, 1.0, 0.05, 0.0, OptionType::Put);
        let err = implied_volatility(&q, &SolverConfig::default()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoArbitrageViolation);
    }

    #[test]
    fn test_outside_bracket() {
        let q = priced_quote(100.0, 100.0, 1.0, 0.05, 0.0, 1.0, OptionType::Call);
        let config = SolverConfig::default().with_sigma_bracket(1e-6, 0.5);
        let err = implied_volatility(&q, &config).unwrap_err();
        match err {
            IVError::OutsideBracket { price_at_max, market_price, .. } => {
                assert!(price_at_max < market_price);
            }
            other => panic!("unexpected {:?}", other),
        }

        // Arbitrage-free all along: a wider bracket recovers σ
        let sol = implied_volatility(&q, &config.with_sigma_bracket(1e-6, 5.0)).unwrap();
        assert!((sol.sigma - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_convergence_failure_at_cap() {
        let q = priced_quote(100.0, 100.0, 1.0, 0.05, 0.0, 0.2, OptionType::Call);
        let config = SolverConfig::default().with_max_iterations(1);
        match implied_volatility(&q, &config).unwrap_err() {
            IVError::ConvergenceFailure { iterations, sigma, .. } => {
                assert_eq!(iterations, 1);
                assert!(sigma > 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_vega_degenerate_when_bisection_runs_out() {
        let q = priced_quote(100.0, 100.0, 1.0, 0.05, 0.0, 0.2, OptionType::Call);
        let config = SolverConfig::default()
            .with_vega_floor(1e6)
            .with_max_iterations(5);
        let err = implied_volatility(&q, &config).unwrap_err();
        assert_eq!(err.kind(), FailureKind::VegaDegenerate);

        // Same floor, enough budget: bisection alone converges
        let config = config.with_max_iterations(200);
        let sol = implied_volatility(&q, &config).unwrap();
        assert_eq!(sol.newton_steps, 0);
        assert!(sol.bisection_steps > 0);
        assert!((sol.sigma - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_newton_falls_back_to_bisection() {
        // OTM put: vega starts under the floor, Newton takes over once
        // bisection reaches steeper ground
        let q = priced_quote(100.0, 70.0, 0.25, 0.05, 0.0, 0.3, OptionType::Put);
        let config = SolverConfig::default().with_vega_floor(1.0);
        let sol = implied_volatility(&q, &config).unwrap();

        assert!(sol.bisection_steps > 0);
        assert!(sol.newton_steps > 0);
        assert!(sol.iterations <= sol.newton_steps + sol.bisection_steps + 1);
        assert!((sol.sigma - 0.3).abs() < 1e-5);
        assert!(sol.residual.abs() < 1e-5);
    }

    #[test]
    fn test_next_sigma_stays_in_bracket() {
        // Step lands inside (0.1, 0.5)
        let (next, step) = next_sigma(0.3, 0.5, 10.0, 0.1, 0.5, 1e-8);
        assert_eq!(step, Step::Newton);
        assert!((next - 0.25).abs() < 1e-15);

        // Overshoots either end of the bracket
        let (next, step) = next_sigma(0.3, -5.0, 10.0, 0.1, 0.5, 1e-8);
        assert_eq!(step, Step::Bisection);
        assert!((next - 0.3).abs() < 1e-15);
        let (next, step) = next_sigma(0.3, 5.0, 10.0, 0.2, 0.5, 1e-8);
        assert_eq!(step, Step::Bisection);
        assert!((next - 0.35).abs() < 1e-15);

        // Landing exactly on an endpoint is not inside
        let (_, step) = next_sigma(0.3, 2.0, 10.0, 0.1, 0.5, 1e-8);
        assert_eq!(step, Step::Bisection);

        // Vega at the floor never takes a Newton step
        let (next, step) = next_sigma(0.3, 1e-3, 1e-8, 0.1, 0.5, 1e-8);
        assert_eq!(step, Step::Bisection);
        assert!((next - 0.3).abs() < 1e-15);
    }

    #[test]
    fn test_expired_quotes() {
        let config = SolverConfig::default();

        let at_intrinsic = quote(110.0, 100.0, 10.0, 0.0, 0.05, 0.0, OptionType::Call);
        let err = implied_volatility(&at_intrinsic, &config).unwrap_err();
        assert_eq!(err.kind(), FailureKind::VegaDegenerate);

        let off_intrinsic = quote(110.0, 100.0, 12.0, 0.0, 0.05, 0.0, OptionType::Call);
        let err = implied_volatility(&off_intrinsic, &config).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoArbitrageViolation);
    }

    #[test]
    fn test_invalid_config() {
        let q = priced_quote(100.0, 100.0, 1.0, 0.05, 0.0, 0.2, OptionType::Call);
        let config = SolverConfig::default().with_sigma_bracket(3.0, 1.0);
        let err = implied_volatility(&q, &config).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidInput);
    }

    #[test]
    fn test_vega_scaling_in_solution() {
        let q = priced_quote(100.0, 100.0, 1.0, 0.05, 0.0, 0.2, OptionType::Call);
        let raw = implied_volatility(&q, &SolverConfig::default()).unwrap();
        let pct = implied_volatility(
            &q,
            &SolverConfig::default().with_vega_scaling(VegaScaling::Per1Percent),
        )
        .unwrap();

        // Scaling is reporting only: same path, same answer
        assert_eq!(raw.sigma, pct.sigma);
        assert_eq!(raw.iterations, pct.iterations);
        assert!((raw.vega - vega(&q, raw.sigma).unwrap()).abs() < 1e-12);
        assert!((pct.vega * 100.0 - raw.vega).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let q = priced_quote(100.0, 110.0, 0.3, 0.01, 0.02, 0.45, OptionType::Put);
        let config = SolverConfig::default();
        let a = implied_volatility(&q, &config).unwrap();
        let b = implied_volatility(&q, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bounds_and_guess() {
        let q = quote(100.0, 100.0, 10.0, 1.0, 0.05, 0.0, OptionType::Call);
        let (lower, upper) = no_arbitrage_bounds(&q);
        assert!((lower - (100.0 - 100.0 * (-0.05_f64).exp())).abs() < 1e-12);
        assert_eq!(upper, 100.0);

        let config = SolverConfig::default();
        let guess = initial_guess(&q, &config);
        assert!(guess >= config.sigma_min && guess <= config.sigma_max);
        assert!(guess > 0.05 && guess < 0.5);
    }
}
