//! Option Greeks
//!
//! Model outputs are kept in raw units: vega per unit of volatility, theta per
//! year, rho per unit of rate. Display conventions (per 1%, per day) are applied
//! only through [`ReportingConvention`], never folded into the raw values.

use serde::{Deserialize, Serialize};

/// Price and first-order sensitivities at a given volatility
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GreeksResult {
    /// Theoretical price
    pub price: f64,
    /// Delta: dV/dS
    pub delta: f64,
    /// Gamma: d²V/dS²
    pub gamma: f64,
    /// Vega: dV/dσ per unit volatility
    pub vega: f64,
    /// Theta: dV/dt per year
    pub theta: f64,
    /// Rho: dV/dr per unit rate
    pub rho: f64,
}

/// How vega is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VegaScaling {
    /// dV/dσ, the true derivative
    #[default]
    PerUnit,
    /// Price change for a 1 vol-point move (dV/dσ / 100)
    Per1Percent,
}

impl VegaScaling {
    /// Convert a raw per-unit vega
    pub fn apply(&self, raw_vega: f64) -> f64 {
        match self {
            VegaScaling::PerUnit => raw_vega,
            VegaScaling::Per1Percent => raw_vega / 100.0,
        }
    }
}

impl GreeksResult {
    /// Vega in the requested scaling
    pub fn vega_scaled(&self, scaling: VegaScaling) -> f64 {
        scaling.apply(self.vega)
    }

    /// Express the raw Greeks under a reporting convention
    pub fn report(&self, convention: &ReportingConvention) -> ReportedGreeks {
        let theta = match convention.theta_days_per_year {
            Some(days) => self.theta / days,
            None => self.theta,
        };
        let rho = if convention.rho_per_percent {
            self.rho / 100.0
        } else {
            self.rho
        };

        ReportedGreeks {
            price: self.price,
            delta: self.delta,
            gamma: self.gamma,
            vega: convention.vega_scaling.apply(self.vega),
            theta,
            rho,
            convention: *convention,
        }
    }
}

/// Unit conventions for reporting Greeks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportingConvention {
    pub vega_scaling: VegaScaling,
    /// Divide theta by this many days; `None` keeps theta per year
    pub theta_days_per_year: Option<f64>,
    /// Report rho per 1% rate move
    pub rho_per_percent: bool,
}

impl Default for ReportingConvention {
    /// Desk convention: vega and rho per 1%, theta per calendar day
    fn default() -> Self {
        Self {
            vega_scaling: VegaScaling::Per1Percent,
            theta_days_per_year: Some(365.0),
            rho_per_percent: true,
        }
    }
}

impl ReportingConvention {
    /// Model units, no rescaling
    pub fn raw() -> Self {
        Self {
            vega_scaling: VegaScaling::PerUnit,
            theta_days_per_year: None,
            rho_per_percent: false,
        }
    }
}

/// Greeks after applying a [`ReportingConvention`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportedGreeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
    /// Convention the values are expressed in
    pub convention: ReportingConvention,
}
