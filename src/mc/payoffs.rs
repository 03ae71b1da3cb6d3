//! European option payoffs
//!
//! - **Call**: max(S_T - K, 0), right to buy at strike K
//! - **Put**: max(K - S_T, 0), right to sell at strike K
//!
//! Both depend on the terminal price only. A recorded path is reduced to
//! its last element before the payoff is applied.

use crate::error::PricingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Undiscounted payoff at maturity, never negative
    pub fn payoff(self, s_t: f64, k: f64) -> f64 {
        match self {
            OptionType::Call => (s_t - k).max(0.0),
            OptionType::Put => (k - s_t).max(0.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(PricingError::InvalidConfiguration {
                field: "option_type".to_string(),
                reason: format!("'{}' is not one of: call, put", other),
            }),
        }
    }
}
