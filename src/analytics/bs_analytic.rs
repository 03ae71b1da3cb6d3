// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes prices for European options
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model, the underlying asset follows:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//!
//! so the Monte Carlo estimator of this crate converges to these
//! closed forms. They serve as the reference value next to a simulated
//! estimate.

use crate::math_utils::norm_cdf;
use crate::mc::payoffs::OptionType;

fn d1_d2(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> (f64, f64) {
    let vol_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

/// Black-Scholes European call option price
///
/// # Formula
/// ```text
/// C(S,K,r,σ,T) = S*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// ```
///
/// Where:
/// ```text
/// d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
///
/// With `σ = 0` (or `T = 0`) the price collapses to the discounted
/// intrinsic value of the deterministic forward, `max(S - K e^(-rT), 0)`.
pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let discounted_strike = k * (-r * t).exp();
    if sigma * t.sqrt() == 0.0 {
        return (s - discounted_strike).max(0.0);
    }
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    s * norm_cdf(d1) - discounted_strike * norm_cdf(d2)
}

/// Black-Scholes European put option price
///
/// # Formula
/// ```text
/// P(S,K,r,σ,T) = K*e^(-rT)*Φ(-d₂) - S*Φ(-d₁)
/// ```
pub fn bs_put_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let discounted_strike = k * (-r * t).exp();
    if sigma * t.sqrt() == 0.0 {
        return (discounted_strike - s).max(0.0);
    }
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    discounted_strike * norm_cdf(-d2) - s * norm_cdf(-d1)
}

pub fn bs_price(option_type: OptionType, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    match option_type {
        OptionType::Call => bs_call_price(s, k, r, sigma, t),
        OptionType::Put => bs_put_price(s, k, r, sigma, t),
    }
}
