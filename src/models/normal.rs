//! Standard normal distribution

use statrs::function::erf::erfc;
use std::f64::consts::{PI, SQRT_2};

/// Beyond this |x| the CDF is pinned to 0 or 1
pub const CDF_SATURATION: f64 = 10.0;

/// Standard normal CDF
///
/// Evaluated as `0.5 * erfc(-x / √2)`, which keeps full relative precision in
/// the lower tail. Saturates to exactly 0 or 1 outside `[-10, 10]`.
pub fn norm_cdf(x: f64) -> f64 {
    if x < -CDF_SATURATION {
        0.0
    } else if x > CDF_SATURATION {
        1.0
    } else {
        0.5 * erfc(-x / SQRT_2)
    }
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}
