// src/models/gbm.rs
//! Geometric Brownian Motion under the risk-neutral measure
//!
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! S_{t+dt} = S_t * exp((r - σ²/2)dt + σ√dt * Z)
//! ```
//!
//! The exact solution is used for every step, so there is no
//! discretisation bias and prices stay strictly positive.

use crate::rng::NormalSource;

#[derive(Debug, Clone, Copy)]
pub struct Gbm {
    pub s0: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl Gbm {
    pub fn new(s0: f64, mu: f64, sigma: f64) -> Self {
        Gbm { s0, mu, sigma }
    }

    /// Precomputed `(drift, diffusion)` of one exact step of length `dt`
    pub fn step_terms(&self, dt: f64) -> (f64, f64) {
        (
            (self.mu - 0.5 * self.sigma * self.sigma) * dt,
            self.sigma * dt.sqrt(),
        )
    }

    /// Simulate `steps` exact steps over `[0, t]` and return the terminal price.
    ///
    /// When `path` is given it is cleared and filled with the `steps + 1`
    /// prices `S_0, S_dt, ..., S_T`.
    pub fn simulate<S: NormalSource + ?Sized>(
        &self,
        t: f64,
        steps: usize,
        source: &mut S,
        mut path: Option<&mut Vec<f64>>,
    ) -> f64 {
        let (drift, diffusion) = self.step_terms(t / steps as f64);

        if let Some(p) = path.as_mut() {
            p.clear();
            p.reserve(steps + 1);
            p.push(self.s0);
        }

        let mut current_s = self.s0;
        for _ in 0..steps {
            let z = source.next_normal();
            current_s *= (drift + diffusion * z).exp();
            if let Some(p) = path.as_mut() {
                p.push(current_s);
            }
        }
        current_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ReplaySource;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_step_matches_closed_form() {
        let gbm = Gbm::new(100.0, 0.05, 0.2);
        let mut source = ReplaySource::constant(0.5);

        let st = gbm.simulate(1.0, 1, &mut source, None);
        let expected = 100.0 * ((0.05 - 0.02) + 0.2 * 0.5_f64).exp();

        assert_relative_eq!(st, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_path_records_every_step() {
        let gbm = Gbm::new(50.0, 0.01, 0.3);
        let mut source = ReplaySource::new(vec![0.3, -1.2, 0.8, 0.0]);
        let mut path = Vec::new();

        let st = gbm.simulate(2.0, 4, &mut source, Some(&mut path));

        assert_eq!(path.len(), 5);
        assert_eq!(path[0], 50.0);
        assert_eq!(*path.last().unwrap(), st);
        assert!(path.iter().all(|&s| s > 0.0));
        assert_eq!(source.consumed(), 4);
    }

    #[test]
    fn test_zero_volatility_is_deterministic_forward() {
        let gbm = Gbm::new(100.0, 0.05, 0.0);
        let mut source = ReplaySource::new(vec![3.0, -3.0, 1.5]);

        let st = gbm.simulate(1.0, 12, &mut source, None);

        assert_relative_eq!(st, 100.0 * 0.05_f64.exp(), max_relative = 1e-12);
    }
}
