//! Chebyshev polynomial functionality for ephemeris interpolation
//!
//! Both JPL ephemeris layouts (the DE binary files and SPK types 2/3) store
//! each coordinate as a Chebyshev series over a short time interval.

use crate::jplephem::errors::{JplephemError, Result};

/// Slack allowed when a normalized time lands a rounding error past ±1
const NORMALIZED_SLACK: f64 = 1e-9;

/// A Chebyshev series borrowed from a coefficient block
///
/// The coefficients are ordered from lowest to highest degree:
/// [c₀, c₁, c₂, ..., cₙ] where the series is
/// f(x) = c₀·T₀(x) + c₁·T₁(x) + ... + cₙ·Tₙ(x)
#[derive(Debug, Clone, Copy)]
pub struct ChebyshevPolynomial<'a> {
    coefficients: &'a [f64],
}

impl<'a> ChebyshevPolynomial<'a> {
    pub fn new(coefficients: &'a [f64]) -> Self {
        Self { coefficients }
    }

    /// Evaluate the series at x using Clenshaw's recurrence
    pub fn evaluate(&self, x: f64) -> f64 {
        let mut b1 = 0.0;
        let mut b2 = 0.0;
        for &c in self.coefficients.iter().skip(1).rev() {
            let b0 = 2.0 * x * b1 - b2 + c;
            b2 = b1;
            b1 = b0;
        }
        match self.coefficients.first() {
            Some(&c0) => x * b1 - b2 + c0,
            None => 0.0,
        }
    }

    /// Derivative of the series with respect to x
    ///
    /// Uses dT_n/dx = n·U_{n-1}(x), accumulated with the forward recurrences.
    pub fn derivative(&self, x: f64) -> f64 {
        if self.coefficients.len() <= 1 {
            return 0.0;
        }

        let mut u_prev = 0.0; // U_{-1}
        let mut u_curr = 1.0; // U_0
        let mut result = 0.0;
        for (n, &c) in self.coefficients.iter().enumerate().skip(1) {
            result += c * n as f64 * u_curr;
            let u_next = 2.0 * x * u_curr - u_prev;
            u_prev = u_curr;
            u_curr = u_next;
        }
        result
    }

    /// Get the degree of the polynomial
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn coefficients(&self) -> &'a [f64] {
        self.coefficients
    }
}

/// Normalize a time to [-1, 1] given the interval midpoint and half-length
pub fn normalize_time(time: f64, midpoint: f64, radius: f64) -> Result<f64> {
    if radius <= 0.0 {
        return Err(JplephemError::InvalidFormat(format!(
            "Chebyshev interval radius must be positive, got {}",
            radius
        )));
    }

    let normalized = (time - midpoint) / radius;
    if normalized.abs() > 1.0 + NORMALIZED_SLACK {
        return Err(JplephemError::OutOfRange {
            jd: time,
            start_jd: midpoint - radius,
            end_jd: midpoint + radius,
        });
    }

    Ok(normalized.clamp(-1.0, 1.0))
}

/// Rescale a derivative from normalized time to physical time
pub fn rescale_derivative(deriv_normalized: f64, radius: f64) -> f64 {
    deriv_normalized / radius
}
