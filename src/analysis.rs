//! Quote analysis
//!
//! Solves implied volatility for a quote, then evaluates Greeks at the implied
//! σ and expresses them under a reporting convention. Batches run sequentially
//! and keep input order; each quote succeeds or fails independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{
    FailureKind, GreeksResult, IVResult, OptionQuote, OptionType, ReportedGreeks,
    ReportingConvention, SolverConfig,
};
use crate::models::{greeks, implied_volatility, IVSolution};

/// Implied volatility and Greeks for one quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteAnalysis {
    pub quote: OptionQuote,
    pub solution: IVSolution,
    /// Greeks at the implied volatility, model units
    pub greeks: GreeksResult,
    /// Same Greeks under the requested convention
    pub reported: ReportedGreeks,
    /// S/K
    pub moneyness: f64,
}

impl QuoteAnalysis {
    pub fn implied_vol(&self) -> f64 {
        self.solution.sigma
    }
}

/// Solve IV, then compute Greeks at it
pub fn analyze_quote(
    quote: &OptionQuote,
    solver: &SolverConfig,
    reporting: &ReportingConvention,
) -> IVResult<QuoteAnalysis> {
    let solution = implied_volatility(quote, solver)?;
    let greeks = greeks(quote, solution.sigma)?;

    Ok(QuoteAnalysis {
        quote: *quote,
        solution,
        greeks,
        reported: greeks.report(reporting),
        moneyness: quote.moneyness(),
    })
}

/// Aggregate view over a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub converged: usize,
    pub failures: BTreeMap<FailureKind, usize>,
    pub iv_min: Option<f64>,
    pub iv_mean: Option<f64>,
    pub iv_max: Option<f64>,
    /// (min, max) delta over converged calls
    pub call_delta_range: Option<(f64, f64)>,
    /// (min, max) delta over converged puts
    pub put_delta_range: Option<(f64, f64)>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.total - self.converged
    }

    fn from_results(results: &[IVResult<QuoteAnalysis>]) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            ..Default::default()
        };
        let mut iv_sum = 0.0;

        for result in results {
            match result {
                Ok(analysis) => {
                    summary.converged += 1;
                    let iv = analysis.implied_vol();
                    iv_sum += iv;
                    summary.iv_min = Some(summary.iv_min.map_or(iv, |m| m.min(iv)));
                    summary.iv_max = Some(summary.iv_max.map_or(iv, |m| m.max(iv)));

                    let range = match analysis.quote.option_type() {
                        OptionType::Call => &mut summary.call_delta_range,
                        OptionType::Put => &mut summary.put_delta_range,
                    };
                    let delta = analysis.greeks.delta;
                    *range = Some(match *range {
                        Some((lo, hi)) => (lo.min(delta), hi.max(delta)),
                        None => (delta, delta),
                    });
                }
                Err(e) => {
                    *summary.failures.entry(e.kind()).or_insert(0) += 1;
                }
            }
        }

        if summary.converged > 0 {
            summary.iv_mean = Some(iv_sum / summary.converged as f64);
        }
        summary
    }
}

/// Per-quote results in input order, plus the summary
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: Vec<IVResult<QuoteAnalysis>>,
    pub summary: BatchSummary,
}

/// Analyze every quote; fails up front only if the solver config is unusable
pub fn analyze_quotes(
    quotes: &[OptionQuote],
    solver: &SolverConfig,
    reporting: &ReportingConvention,
) -> IVResult<BatchReport> {
    solver.validate()?;

    let results: Vec<_> = quotes
        .iter()
        .map(|q| analyze_quote(q, solver, reporting))
        .collect();
    let summary = BatchSummary::from_results(&results);

    if summary.failed() > 0 {
        tracing::warn!(
            "{} of {} quotes failed: {:?}",
            summary.failed(),
            summary.total,
            summary.failures
        );
    }
    tracing::info!(
        "Analyzed {} quotes, {} converged",
        summary.total,
        summary.converged
    );

    Ok(BatchReport { results, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IVError;
    use crate::models::price;

    fn priced(spot: f64, strike: f64, vol: f64, option_type: OptionType) -> OptionQuote {
        let q = OptionQuote::new(spot, strike, 1.0, 0.25, 0.068, 0.0, option_type).unwrap();
        q.with_market_price(price(&q, vol).unwrap()).unwrap()
    }

    #[test]
    fn test_analyze_quote() {
        let q = priced(3500.0, 3600.0, 0.22, OptionType::Call);
        let a = analyze_quote(&q, &SolverConfig::default(), &ReportingConvention::default()).unwrap();

        assert!((a.implied_vol() - 0.22).abs() < 1e-6);
        assert!((a.moneyness - 3500.0 / 3600.0).abs() < 1e-15);
        assert!((a.reported.vega - a.greeks.vega / 100.0).abs() < 1e-12);
        assert!((a.reported.theta - a.greeks.theta / 365.0).abs() < 1e-12);
        assert!((a.greeks.price - q.market_price()).abs() < 1e-6);
    }

    #[test]
    fn test_batch_summary() {
        let quotes = vec![
            priced(100.0, 95.0, 0.3, OptionType::Call),
            priced(100.0, 105.0, 0.25, OptionType::Put),
            // Above the spot upper bound
            OptionQuote::new(100.0, 100.0, 150.0, 0.25, 0.068, 0.0, OptionType::Call).unwrap(),
            priced(100.0, 100.0, 0.4, OptionType::Put),
        ];

        let report =
            analyze_quotes(&quotes, &SolverConfig::default(), &ReportingConvention::default())
                .unwrap();
        let s = &report.summary;

        assert_eq!(report.results.len(), 4);
        assert!(matches!(report.results[2], Err(IVError::NoArbitrageViolation { .. })));
        assert_eq!(s.total, 4);
        assert_eq!(s.converged, 3);
        assert_eq!(s.failed(), 1);
        assert_eq!(s.failures.get(&FailureKind::NoArbitrageViolation), Some(&1));

        assert!((s.iv_min.unwrap() - 0.25).abs() < 1e-6);
        assert!((s.iv_max.unwrap() - 0.4).abs() < 1e-6);
        let (lo, hi) = s.call_delta_range.unwrap();
        assert!(lo == hi && lo > 0.5 && lo < 1.0);
        let (lo, hi) = s.put_delta_range.unwrap();
        assert!(lo <= hi && hi < 0.0 && lo > -1.0);
    }

    #[test]
    fn test_batch_rejects_bad_config() {
        let quotes = vec![priced(100.0, 100.0, 0.2, OptionType::Call)];
        let config = SolverConfig::default().with_max_iterations(0);
        assert!(analyze_quotes(&quotes, &config, &ReportingConvention::default()).is_err());
    }

    #[test]
    fn test_empty_batch() {
        let report =
            analyze_quotes(&[], &SolverConfig::default(), &ReportingConvention::raw()).unwrap();
        assert_eq!(report.summary.total, 0);
        assert!(report.summary.iv_mean.is_none());
    }
}
