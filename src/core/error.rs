//! Error types for pricing and implied volatility

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IVError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "No-arbitrage violation: market price {market_price} outside feasible band ({lower}, {upper})"
    )]
    NoArbitrageViolation {
        market_price: f64,
        lower: f64,
        upper: f64,
    },

    /// Bracket exhaustion: the price is arbitrage-free, but the implied σ
    /// lies outside `[sigma_min, sigma_max]`. Widening the bracket may recover it.
    #[error(
        "Market price {market_price} not attainable within vol bracket [{sigma_min}, {sigma_max}] \
         (model prices {price_at_min} .. {price_at_max})"
    )]
    OutsideBracket {
        market_price: f64,
        sigma_min: f64,
        sigma_max: f64,
        price_at_min: f64,
        price_at_max: f64,
    },

    #[error("Vega degenerate: max vega {max_vega:e} below stability floor after {iterations} iterations")]
    VegaDegenerate { iterations: u32, max_vega: f64 },

    #[error("IV solver did not converge after {iterations} iterations (sigma {sigma}, residual {residual:e})")]
    ConvergenceFailure {
        iterations: u32,
        sigma: f64,
        residual: f64,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type IVResult<T> = Result<T, IVError>;

/// Fieldless tag of an [`IVError`], used for grouping failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailureKind {
    InvalidInput,
    NoArbitrageViolation,
    OutsideBracket,
    VegaDegenerate,
    ConvergenceFailure,
    Serialization,
}

impl IVError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            IVError::InvalidInput(_) => FailureKind::InvalidInput,
            IVError::NoArbitrageViolation { .. } => FailureKind::NoArbitrageViolation,
            IVError::OutsideBracket { .. } => FailureKind::OutsideBracket,
            IVError::VegaDegenerate { .. } => FailureKind::VegaDegenerate,
            IVError::ConvergenceFailure { .. } => FailureKind::ConvergenceFailure,
            IVError::Serialization(_) => FailureKind::Serialization,
        }
    }
}

/// Reject NaN and infinities with a named field
pub(crate) fn ensure_finite(name: &str, value: f64) -> IVResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(IVError::invalid_input(format!("{} must be finite, got {}", name, value)))
    }
}

/// Reject non-finite and non-positive values with a named field
pub(crate) fn ensure_positive(name: &str, value: f64) -> IVResult<()> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(IVError::invalid_input(format!("{} must be positive, got {}", name, value)))
    }
}
