//! # gbm-mc-pricer: Monte Carlo Pricing of European Options
//!
//! Estimates European call and put prices by simulating Geometric Brownian
//! Motion, and reports the estimate together with its standard error and a
//! normal confidence interval.
//!
//! ## Key Features
//!
//! - **Injected randomness**: any `rand::Rng`, or a replayed list of draws
//! - **Terminal prices and paths**: everything a histogram or path chart needs
//! - **Parallel engine**: per-trial seeded streams with Rayon, reproducible
//!   for any thread count
//! - **Reference values**: closed-form Black-Scholes prices for comparison
//!
//! ## Quick Start
//!
//! ```rust
//! use gbm_mc_pricer::mc::mc_engine::{simulate, SimulationParameters};
//! use gbm_mc_pricer::mc::payoffs::OptionType;
//! use gbm_mc_pricer::rng::seed_rng_from_u64;
//!
//! let params = SimulationParameters {
//!     initial_price: 100.0,
//!     strike_price: 100.0,
//!     volatility: 0.2,
//!     risk_free_rate: 0.05,
//!     time_to_maturity: 1.0,
//!     num_simulations: 100_000,
//!     option_type: OptionType::Call,
//!     ..Default::default()
//! };
//!
//! let mut rng = seed_rng_from_u64(42);
//! let result = simulate(&params, &mut rng).expect("Valid parameters");
//! let ci = result.confidence_interval;
//! println!("Call price: {:.4} [{:.4}, {:.4}]", result.price_estimate, ci.low, ci.high);
//! ```
//!
//! ## Mathematical Foundation
//!
//! Under the risk-neutral measure the terminal price is
//! `S_T = S_0 * exp((r - σ²/2)T + σ√T * Z)`, and the option value is the
//! discounted expectation `e^{-rT} E[payoff(S_T)]`, estimated by the sample
//! mean over N independent trials.

// Module declarations
pub mod analytics;
pub mod config;
pub mod error;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod output;
pub mod rng;

// Re-export commonly used types for convenience
pub use error::{PricingError, PricingResult};
pub use mc::mc_engine::{
    price_call_and_put, price_call_and_put_parallel, simulate, simulate_parallel, CallPutPair,
    SimulationParameters, SimulationResult,
};
pub use mc::payoffs::OptionType;
