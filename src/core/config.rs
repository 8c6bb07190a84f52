//! Configuration for the implied volatility solver

use serde::{Deserialize, Serialize};

use super::error::{IVError, IVResult};
use super::greeks::VegaScaling;

/// Solver tolerances, bracket and iteration budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop when |BS(σ) - market| falls below this (price units)
    /// Default: 1e-6
    pub price_tolerance: f64,

    /// Stop when successive σ estimates differ by less than this
    /// Default: 1e-8
    pub sigma_tolerance: f64,

    /// Hard cap on pricer evaluations inside the iteration loop
    /// Default: 100
    pub max_iterations: u32,

    /// Lower end of the volatility bracket
    /// Default: 1e-6
    pub sigma_min: f64,

    /// Upper end of the volatility bracket (5.0 = 500% annualized)
    /// Default: 5.0
    pub sigma_max: f64,

    /// Below this raw vega a Newton step is not attempted
    /// Default: 1e-8
    pub vega_floor: f64,

    /// Scaling of the vega reported with a solution; Newton steps always use raw vega
    /// Default: PerUnit
    pub vega_scaling: VegaScaling,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            price_tolerance: 1e-6,
            sigma_tolerance: 1e-8,
            max_iterations: 100,
            sigma_min: 1e-6,
            sigma_max: 5.0,
            vega_floor: 1e-8,
            vega_scaling: VegaScaling::PerUnit,
        }
    }
}

impl SolverConfig {
    /// Tight tolerances for reference work and round-trip checks
    pub fn precise() -> Self {
        Self {
            price_tolerance: 1e-10,
            sigma_tolerance: 1e-12,
            max_iterations: 200,
            ..Default::default()
        }
    }

    /// Loose tolerances for screening large chains
    pub fn fast() -> Self {
        Self {
            price_tolerance: 1e-4,
            sigma_tolerance: 1e-6,
            max_iterations: 50,
            ..Default::default()
        }
    }

    pub fn with_price_tolerance(mut self, tolerance: f64) -> Self {
        self.price_tolerance = tolerance;
        self
    }

    pub fn with_sigma_tolerance(mut self, tolerance: f64) -> Self {
        self.sigma_tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_sigma_bracket(mut self, sigma_min: f64, sigma_max: f64) -> Self {
        self.sigma_min = sigma_min;
        self.sigma_max = sigma_max;
        self
    }

    pub fn with_vega_floor(mut self, vega_floor: f64) -> Self {
        self.vega_floor = vega_floor;
        self
    }

    pub fn with_vega_scaling(mut self, scaling: VegaScaling) -> Self {
        self.vega_scaling = scaling;
        self
    }

    /// Volatility bracket as `(sigma_min, sigma_max)`
    pub fn sigma_bracket(&self) -> (f64, f64) {
        (self.sigma_min, self.sigma_max)
    }

    /// Parse from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> IVResult<Self> {
        let config: SolverConfig =
            serde_json::from_str(json).map_err(|e| IVError::serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that tolerances, bracket and iteration cap are usable
    pub fn validate(&self) -> IVResult<()> {
        let positive = [
            ("price_tolerance", self.price_tolerance),
            ("sigma_tolerance", self.sigma_tolerance),
            ("sigma_min", self.sigma_min),
            ("sigma_max", self.sigma_max),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(IVError::invalid_input(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if !(self.vega_floor.is_finite() && self.vega_floor >= 0.0) {
            return Err(IVError::invalid_input(format!(
                "vega_floor must be non-negative and finite, got {}",
                self.vega_floor
            )));
        }
        if self.sigma_min >= self.sigma_max {
            return Err(IVError::invalid_input(format!(
                "sigma bracket [{}, {}] is empty",
                self.sigma_min, self.sigma_max
            )));
        }
        if self.max_iterations == 0 {
            return Err(IVError::invalid_input("max_iterations must be at least 1"));
        }
        Ok(())
    }
}
