// src/math_utils.rs
use statrs::function::erf;
use std::f64::consts::SQRT_2;

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Inverse of the standard normal CDF, `Φ⁻¹(p) = √2 · erf⁻¹(2p − 1)`
pub fn norm_quantile(p: f64) -> f64 {
    SQRT_2 * erf::erf_inv(2.0 * p - 1.0)
}

/// Two-sided critical value `z` such that `P(|Z| ≤ z) = level`
///
/// 0.95 → 1.959964, 0.99 → 2.575829.
pub fn two_sided_z(level: f64) -> f64 {
    norm_quantile(0.5 * (1.0 + level))
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_two_sided_z_known_levels() {
        assert_abs_diff_eq!(two_sided_z(0.95), 1.959_963_985, epsilon = 1e-6);
        assert_abs_diff_eq!(two_sided_z(0.99), 2.575_829_304, epsilon = 1e-6);
        assert_abs_diff_eq!(two_sided_z(0.90), 1.644_853_627, epsilon = 1e-6);
    }

    #[test]
    fn test_quantile_inverts_cdf() {
        for &p in &[0.01, 0.2, 0.5, 0.8, 0.975] {
            assert_abs_diff_eq!(norm_cdf(norm_quantile(p)), p, epsilon = 1e-9);
        }
    }
}
