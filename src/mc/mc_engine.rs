// src/mc/mc_engine.rs
use crate::error::{validation::*, PricingResult};
use crate::mc::payoffs::OptionType;
use crate::mc::stats::{ConfidenceInterval, RunningStats};
use crate::models::gbm::Gbm;
use crate::rng::{self, NormalSource, RngFactory};
use ndarray::{Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

/// Inputs of one pricing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParameters {
    pub initial_price: f64,
    pub strike_price: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub time_to_maturity: f64,
    pub num_simulations: usize,
    /// Steps per path; full paths are only recorded when this exceeds 1
    pub num_steps: usize,
    pub option_type: OptionType,
    pub confidence_level: f64,
}

impl SimulationParameters {
    /// Validate the parameters against their domains
    pub fn validate(&self) -> PricingResult<()> {
        validate_positive("initial_price", self.initial_price)?;
        validate_positive("strike_price", self.strike_price)?;
        validate_non_negative("volatility", self.volatility)?;
        validate_finite("risk_free_rate", self.risk_free_rate)?;
        validate_positive("time_to_maturity", self.time_to_maturity)?;
        validate_simulations(self.num_simulations)?;
        validate_steps(self.num_steps)?;
        if self.records_paths() {
            validate_path_points(self.num_simulations, self.num_steps)?;
        }
        validate_open_unit_interval("confidence_level", self.confidence_level)?;
        Ok(())
    }

    pub fn with_option_type(&self, option_type: OptionType) -> Self {
        SimulationParameters {
            option_type,
            ..self.clone()
        }
    }

    /// `e^{-rT}`
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_maturity).exp()
    }

    pub fn records_paths(&self) -> bool {
        self.num_steps > 1
    }

    fn model(&self) -> Gbm {
        Gbm::new(self.initial_price, self.risk_free_rate, self.volatility)
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            initial_price: 100.0,
            strike_price: 100.0,
            volatility: 0.2,
            risk_free_rate: 0.05,
            time_to_maturity: 1.0,
            num_simulations: 10_000,
            num_steps: 1,
            option_type: OptionType::Call,
            confidence_level: 0.95,
        }
    }
}

/// Output of one pricing run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub option_type: OptionType,
    pub num_simulations: usize,
    pub confidence_level: f64,
    /// Discounted mean payoff
    pub price_estimate: f64,
    pub standard_error: f64,
    pub confidence_interval: ConfidenceInterval,
    /// `S_T` of every trial, in trial order
    pub terminal_prices: Vec<f64>,
    /// One row of `num_steps + 1` prices per trial, when paths were recorded
    pub paths: Option<Array2<f64>>,
}

impl SimulationResult {
    /// False when extreme parameters overflowed the exponential
    pub fn is_finite(&self) -> bool {
        self.price_estimate.is_finite() && self.standard_error.is_finite()
    }

    /// Undiscounted payoff of every trial, in trial order
    pub fn payoffs(&self, strike_price: f64) -> Vec<f64> {
        self.terminal_prices
            .iter()
            .map(|&s_t| self.option_type.payoff(s_t, strike_price))
            .collect()
    }

    /// Fraction of trials that finished in the money
    pub fn in_the_money_ratio(&self, strike_price: f64) -> f64 {
        let itm = self
            .terminal_prices
            .iter()
            .filter(|&&s_t| self.option_type.payoff(s_t, strike_price) > 0.0)
            .count();
        itm as f64 / self.terminal_prices.len() as f64
    }
}

fn finish(
    params: &SimulationParameters,
    stats: RunningStats,
    terminal_prices: Vec<f64>,
    paths: Option<Array2<f64>>,
) -> SimulationResult {
    let price_estimate = stats.mean();
    let standard_error = stats.standard_error();
    let confidence_interval =
        ConfidenceInterval::around(price_estimate, standard_error, params.confidence_level);

    if !price_estimate.is_finite() {
        warn!(
            price_estimate,
            standard_error, "Monte Carlo estimate is not finite; returning it unmodified"
        );
    }
    debug!(
        price_estimate,
        standard_error,
        ci_low = confidence_interval.low,
        ci_high = confidence_interval.high,
        "simulation finished"
    );

    SimulationResult {
        option_type: params.option_type,
        num_simulations: params.num_simulations,
        confidence_level: params.confidence_level,
        price_estimate,
        standard_error,
        confidence_interval,
        terminal_prices,
        paths,
    }
}

/// Monte Carlo price of a European option under Geometric Brownian Motion
///
/// # Math Framework
///
/// Simulates the risk-neutral GBM SDE:
/// ```text
/// dS_t = r S_t dt + σ S_t dW_t
/// ```
///
/// With exact solution:
/// ```text
/// S_T = S_0 * exp((r - σ²/2)T + σ√T * Z)
/// ```
/// where Z ~ N(0,1). With `num_steps = M > 1` the same solution is applied
/// over M steps of length T/M and every intermediate price is kept.
///
/// The estimate is the mean of `e^{-rT} * payoff(S_T)`, its standard error
/// the sample standard deviation over √N, and the confidence interval
/// `estimate ± z * standard_error` for the two-sided normal quantile z.
///
/// # Randomness
///
/// Trial `i` consumes draws `i*M .. (i+1)*M` of `source`, so a seeded
/// generator reproduces the result exactly.
///
/// # Errors
///
/// Returns `PricingError` for parameters outside their domain. Validation
/// runs before a single draw is taken. Non-finite prices caused by extreme
/// `σ√T` are not errors and are passed through.
pub fn simulate<S: NormalSource + ?Sized>(
    params: &SimulationParameters,
    source: &mut S,
) -> PricingResult<SimulationResult> {
    params.validate()?;

    let n = params.num_simulations;
    let steps = params.num_steps;
    let strike = params.strike_price;
    let option_type = params.option_type;
    let discount = params.discount_factor();
    let model = params.model();

    let span = debug_span!("simulate", n, steps, %option_type);
    let _enter = span.enter();
    debug!(
        drift = (params.risk_free_rate - 0.5 * params.volatility * params.volatility)
            * params.time_to_maturity,
        diffusion = params.volatility * params.time_to_maturity.sqrt(),
        discount,
        "simulation terms"
    );

    let mut terminal_prices = Vec::with_capacity(n);
    let mut stats = RunningStats::new();
    let mut paths = params
        .records_paths()
        .then(|| Array2::<f64>::zeros((n, steps + 1)));
    let mut path_buf = Vec::with_capacity(steps + 1);

    for i in 0..n {
        let recording = paths.is_some();
        let st = model.simulate(
            params.time_to_maturity,
            steps,
            &mut *source,
            recording.then_some(&mut path_buf),
        );

        if let Some(paths) = paths.as_mut() {
            for (dst, &src) in paths.row_mut(i).iter_mut().zip(&path_buf) {
                *dst = src;
            }
        }

        stats.push(discount * option_type.payoff(st, strike));
        terminal_prices.push(st);
    }

    Ok(finish(params, stats, terminal_prices, paths))
}

const STATS_CHUNK: usize = 4096;

/// Parallel version of [`simulate`] built on rayon
///
/// Trial `i` draws from its own generator seeded with `seed + i`, so the
/// result is identical for any thread count. It differs from the
/// sequential engine fed by a single stream with the same seed.
pub fn simulate_parallel(
    params: &SimulationParameters,
    seed: u64,
) -> PricingResult<SimulationResult> {
    params.validate()?;

    let n = params.num_simulations;
    let steps = params.num_steps;
    let t = params.time_to_maturity;
    let strike = params.strike_price;
    let option_type = params.option_type;
    let discount = params.discount_factor();
    let model = params.model();
    let factory = RngFactory::new(seed);

    let span = debug_span!("simulate_parallel", n, steps, %option_type, seed);
    let _enter = span.enter();
    debug!(threads = rayon::current_num_threads(), "dispatching trials");

    let mut paths = params
        .records_paths()
        .then(|| Array2::<f64>::zeros((n, steps + 1)));

    let terminal_prices: Vec<f64> = match paths.as_mut() {
        Some(paths) => paths
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .map_init(
                || Vec::with_capacity(steps + 1),
                |buf, (i, mut row)| {
                    let mut rng = factory.trial_rng(i as u64);
                    let st = model.simulate(t, steps, &mut rng, Some(&mut *buf));
                    for (dst, &src) in row.iter_mut().zip(buf.iter()) {
                        *dst = src;
                    }
                    st
                },
            )
            .collect(),
        None => (0..n)
            .into_par_iter()
            .map(|i| {
                let mut rng = factory.trial_rng(i as u64);
                model.simulate(t, steps, &mut rng, None)
            })
            .collect(),
    };

    // Fixed chunks merged in order keep the statistics independent of scheduling
    let stats = terminal_prices
        .par_chunks(STATS_CHUNK)
        .map(|chunk| {
            chunk
                .iter()
                .map(|&st| discount * option_type.payoff(st, strike))
                .collect::<RunningStats>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .fold(RunningStats::new(), RunningStats::merge);

    Ok(finish(params, stats, terminal_prices, paths))
}

/// Call and put priced on the same random numbers
#[derive(Debug, Clone, Serialize)]
pub struct CallPutPair {
    pub call: SimulationResult,
    pub put: SimulationResult,
    /// `S_0 - K e^{-rT}`
    pub parity_value: f64,
}

impl CallPutPair {
    /// `(C - P) - (S_0 - K e^{-rT})`, zero up to sampling error
    pub fn parity_gap(&self) -> f64 {
        self.call.price_estimate - self.put.price_estimate - self.parity_value
    }

    /// Bound on the parity gap at `z` standard errors
    ///
    /// Call and put payoffs are negatively correlated, so the standard errors
    /// are added rather than combined in quadrature.
    pub fn parity_tolerance(&self, z: f64) -> f64 {
        z * (self.call.standard_error + self.put.standard_error)
    }

    pub fn satisfies_parity(&self, z: f64) -> bool {
        self.parity_gap().abs() <= self.parity_tolerance(z)
    }
}

impl CallPutPair {
    fn from_legs(params: &SimulationParameters, call: SimulationResult, put: SimulationResult) -> Self {
        CallPutPair {
            call,
            put,
            parity_value: params.initial_price - params.strike_price * params.discount_factor(),
        }
    }
}

/// Price a call and a put with identical parameters
///
/// Each leg gets a fresh generator seeded with `seed`, mirroring a host
/// that reruns the simulation per option type with a fixed seed.
pub fn price_call_and_put(params: &SimulationParameters, seed: u64) -> PricingResult<CallPutPair> {
    params.validate()?;

    let call = simulate(
        &params.with_option_type(OptionType::Call),
        &mut rng::seed_rng_from_u64(seed),
    )?;
    let put = simulate(
        &params.with_option_type(OptionType::Put),
        &mut rng::seed_rng_from_u64(seed),
    )?;

    Ok(CallPutPair::from_legs(params, call, put))
}

/// [`price_call_and_put`] on the parallel engine; both legs share the
/// per-trial streams derived from `seed`.
pub fn price_call_and_put_parallel(
    params: &SimulationParameters,
    seed: u64,
) -> PricingResult<CallPutPair> {
    params.validate()?;

    let call = simulate_parallel(&params.with_option_type(OptionType::Call), seed)?;
    let put = simulate_parallel(&params.with_option_type(OptionType::Put), seed)?;

    Ok(CallPutPair::from_legs(params, call, put))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use crate::rng::ReplaySource;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(SimulationParameters::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let base = SimulationParameters::default();
        let cases = [
            SimulationParameters { initial_price: -5.0, ..base.clone() },
            SimulationParameters { strike_price: 0.0, ..base.clone() },
            SimulationParameters { volatility: -0.1, ..base.clone() },
            SimulationParameters { time_to_maturity: 0.0, ..base.clone() },
            SimulationParameters { num_simulations: 0, ..base.clone() },
            SimulationParameters { num_steps: 0, ..base.clone() },
            SimulationParameters { confidence_level: 1.0, ..base.clone() },
            SimulationParameters { risk_free_rate: f64::NAN, ..base.clone() },
        ];
        for params in &cases {
            assert!(params.validate().is_err(), "accepted {:?}", params);
        }
    }

    #[test]
    fn test_invalid_input_consumes_no_randomness() {
        let params = SimulationParameters {
            initial_price: -5.0,
            ..Default::default()
        };
        let mut source = ReplaySource::constant(0.0);

        let err = simulate(&params, &mut source).unwrap_err();

        assert!(matches!(err, PricingError::InvalidParameter { .. }));
        assert_eq!(err.field(), "initial_price");
        assert_eq!(source.consumed(), 0);
    }

    #[test]
    fn test_oversized_path_matrix_rejected_before_any_draw() {
        let params = SimulationParameters {
            num_simulations: MAX_SIMULATIONS,
            num_steps: MAX_STEPS,
            ..Default::default()
        };
        let mut source = ReplaySource::constant(0.0);

        let err = simulate(&params, &mut source).unwrap_err();

        assert!(matches!(err, PricingError::InvalidConfiguration { .. }));
        assert_eq!(err.field(), "num_steps");
        assert_eq!(source.consumed(), 0);
        assert!(simulate_parallel(&params, 1).is_err());

        // Terminal prices alone stay within bounds
        let terminal_only = SimulationParameters {
            num_steps: 1,
            ..params
        };
        assert!(terminal_only.validate().is_ok());
    }

    #[test]
    fn test_hand_picked_draws() {
        // Z = +1 and Z = -1 alternate; S_T = 100 * exp(0.03 ± 0.2)
        let params = SimulationParameters {
            num_simulations: 4,
            ..Default::default()
        };
        let mut source = ReplaySource::new(vec![1.0, -1.0]);

        let result = simulate(&params, &mut source).unwrap();

        let up = 100.0 * (0.03_f64 + 0.2).exp();
        let down = 100.0 * (0.03_f64 - 0.2).exp();
        let discount = (-0.05_f64).exp();
        let expected = discount * (up - 100.0) / 2.0;

        assert_eq!(result.terminal_prices.len(), 4);
        assert_relative_eq!(result.terminal_prices[0], up, max_relative = 1e-12);
        assert_relative_eq!(result.terminal_prices[1], down, max_relative = 1e-12);
        assert_relative_eq!(result.price_estimate, expected, max_relative = 1e-12);
        assert!(result.paths.is_none());
        assert_eq!(source.consumed(), 4);
    }

    #[test]
    fn test_paths_recorded_when_multi_step() {
        let params = SimulationParameters {
            num_simulations: 25,
            num_steps: 12,
            ..Default::default()
        };
        let mut rng = rng::seed_rng_from_u64(7);

        let result = simulate(&params, &mut rng).unwrap();
        let paths = result.paths.as_ref().expect("paths recorded");

        assert_eq!(paths.dim(), (25, 13));
        for (row, &st) in paths.rows().into_iter().zip(&result.terminal_prices) {
            assert_eq!(row[0], 100.0);
            assert_eq!(row[12], st);
            assert!(row.iter().all(|&s| s > 0.0));
        }
    }

    #[test]
    fn test_single_trial_has_degenerate_interval() {
        let params = SimulationParameters {
            num_simulations: 1,
            ..Default::default()
        };
        let result = simulate(&params, &mut ReplaySource::constant(0.7)).unwrap();

        assert_eq!(result.standard_error, 0.0);
        assert_eq!(result.confidence_interval.low, result.price_estimate);
        assert_eq!(result.confidence_interval.high, result.price_estimate);
    }

    #[test]
    fn test_parallel_is_reproducible() {
        let params = SimulationParameters {
            num_simulations: 2_000,
            num_steps: 4,
            ..Default::default()
        };

        let a = simulate_parallel(&params, 99).unwrap();
        let b = simulate_parallel(&params, 99).unwrap();

        assert_eq!(a.terminal_prices, b.terminal_prices);
        assert_eq!(a.price_estimate, b.price_estimate);
        assert_eq!(a.paths, b.paths);
    }

    #[test]
    fn test_parallel_matches_sequential_per_trial_streams() {
        let params = SimulationParameters {
            num_simulations: 50,
            ..Default::default()
        };
        let parallel = simulate_parallel(&params, 5).unwrap();

        let factory = RngFactory::new(5);
        let model = params.model();
        for (i, &st) in parallel.terminal_prices.iter().enumerate() {
            let mut rng = factory.trial_rng(i as u64);
            assert_eq!(st, model.simulate(1.0, 1, &mut rng, None));
        }
    }

    #[test]
    fn test_call_put_pair_shares_draws() {
        let params = SimulationParameters {
            num_simulations: 5_000,
            ..Default::default()
        };
        let pair = price_call_and_put(&params, 42).unwrap();

        assert_eq!(pair.call.terminal_prices, pair.put.terminal_prices);
        assert_eq!(pair.call.option_type, OptionType::Call);
        assert_eq!(pair.put.option_type, OptionType::Put);
        assert!(pair.satisfies_parity(4.0), "gap {}", pair.parity_gap());
    }

    #[test]
    fn test_parallel_call_put_pair() {
        let params = SimulationParameters {
            num_simulations: 5_000,
            num_steps: 2,
            ..Default::default()
        };
        let pair = price_call_and_put_parallel(&params, 42).unwrap();
        let call_only = simulate_parallel(&params, 42).unwrap();

        assert_eq!(pair.call.terminal_prices, pair.put.terminal_prices);
        assert_eq!(pair.call.terminal_prices, call_only.terminal_prices);
        assert_eq!(pair.put.option_type, OptionType::Put);
        assert!(pair.satisfies_parity(4.0), "gap {}", pair.parity_gap());
    }
}
