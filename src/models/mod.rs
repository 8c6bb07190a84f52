//! Pricing models
//!
//! Implements, leaves first:
//! - Standard normal distribution
//! - Black-Scholes European pricing and Greeks
//! - Implied volatility solver (Newton-Raphson with bisection fallback)

pub mod normal;
pub mod black_scholes;
pub mod implied_vol;

pub use normal::*;
pub use black_scholes::*;
pub use implied_vol::*;
