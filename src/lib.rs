//! # IV Greeks - Black-Scholes Implied Volatility and Greeks
//!
//! Theoretical prices, risk sensitivities and implied volatility for European
//! options under Black-Scholes with a continuous dividend yield.
//!
//! ## Overview
//!
//! Three layers, leaves first:
//! - **Normal distribution**: `norm_cdf` / `norm_pdf`
//! - **Black-Scholes**: d1/d2, price, vega, full Greeks for a quote at a trial σ
//! - **Implied volatility**: safeguarded Newton-Raphson on raw vega with a
//!   bisection fallback inside a configurable volatility bracket
//!
//! On top sits a small analysis layer that solves IV for a quote and reports
//! Greeks at the implied volatility.
//!
//! ## Usage
//!
//! ```rust
//! use iv_greeks::prelude::*;
//!
//! let quote = OptionQuote::new(3500.0, 3500.0, 85.0, 0.0833, 0.06, 0.0, OptionType::Call).unwrap();
//!
//! let solution = implied_volatility(&quote, &SolverConfig::default()).unwrap();
//! assert!((solution.sigma - 0.18897).abs() < 1e-4);
//!
//! let g = bs_greeks(&quote, solution.sigma).unwrap();
//! assert!(g.delta > 0.5);
//! ```
//!
//! ## What This Crate Does NOT Do
//!
//! - American exercise or discrete dividends
//! - Local or stochastic volatility, surface interpolation
//! - Data sourcing, persistence, parallel batch scheduling
//!
//! Every function is pure; a caller can fan quotes out across threads freely.

pub mod analysis;
pub mod core;
pub mod models;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        year_fraction, FailureKind, GreeksResult, IVError, IVResult, OptionQuote, OptionType,
        ReportedGreeks, ReportingConvention, SolverConfig, VegaScaling,
    };

    // Models
    pub use crate::models::{
        d1_d2,
        greeks as bs_greeks,
        implied_volatility,
        initial_guess,
        no_arbitrage_bounds,
        norm_cdf,
        norm_pdf,
        price as bs_price,
        vega as bs_vega,
        IVSolution,
        IVSolveResult,
    };

    // Analysis
    pub use crate::analysis::{
        analyze_quote, analyze_quotes, BatchReport, BatchSummary, QuoteAnalysis,
    };
}

// Re-export main types at crate root
pub use crate::core::{IVError, IVResult, OptionQuote, OptionType, SolverConfig};
pub use crate::models::{implied_volatility, IVSolution};
