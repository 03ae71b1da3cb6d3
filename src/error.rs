// src/error.rs
use std::fmt;

/// Errors raised by the pricing engine
///
/// Parameter errors are detected while validating [`SimulationParameters`]
/// and therefore before any random draw is consumed.
///
/// [`SimulationParameters`]: crate::mc::mc_engine::SimulationParameters
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    /// A real-valued parameter lies outside its domain
    InvalidParameter {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// A count (simulations, steps, bins) is unusable
    InvalidConfiguration { field: String, reason: String },

    /// A run configuration file could not be read or parsed
    ConfigFile { path: String, reason: String },
}

impl PricingError {
    /// Name of the offending field, for callers that map errors back onto inputs
    pub fn field(&self) -> &str {
        match self {
            PricingError::InvalidParameter { parameter, .. } => parameter,
            PricingError::InvalidConfiguration { field, .. } => field,
            PricingError::ConfigFile { path, .. } => path,
        }
    }
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidParameter {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            PricingError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            PricingError::ConfigFile { path, reason } => {
                write!(f, "Cannot load configuration file '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// Result type alias for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Validation utilities
pub mod validation {
    use super::{PricingError, PricingResult};

    /// Upper bound on trials per run; keeps `terminal_prices` allocatable
    pub const MAX_SIMULATIONS: usize = 100_000_000;

    /// Upper bound on steps per path
    pub const MAX_STEPS: usize = 100_000;

    /// Upper bound on recorded prices, `simulations * (steps + 1)` (800 MB of f64)
    pub const MAX_PATH_POINTS: usize = 100_000_000;

    fn invalid(name: &str, value: f64, constraint: &str) -> PricingError {
        PricingError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: constraint.to_string(),
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> PricingResult<()> {
        if !value.is_finite() {
            Err(invalid(name, value, "must be finite (not NaN or infinite)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is finite and strictly positive
    pub fn validate_positive(name: &str, value: f64) -> PricingResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(invalid(name, value, "must be positive (> 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> PricingResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(invalid(name, value, "must be non-negative (≥ 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter lies strictly between 0 and 1
    pub fn validate_open_unit_interval(name: &str, value: f64) -> PricingResult<()> {
        // NaN fails both comparisons, so test the accepted range directly
        if value > 0.0 && value < 1.0 {
            Ok(())
        } else {
            Err(invalid(name, value, "must be in the open interval (0, 1)"))
        }
    }

    /// Validate the number of Monte Carlo trials
    pub fn validate_simulations(simulations: usize) -> PricingResult<()> {
        if simulations == 0 {
            Err(PricingError::InvalidParameter {
                parameter: "num_simulations".to_string(),
                value: 0.0,
                constraint: "must be at least 1".to_string(),
            })
        } else if simulations > MAX_SIMULATIONS {
            Err(PricingError::InvalidConfiguration {
                field: "num_simulations".to_string(),
                reason: format!("exceeds maximum allowed ({})", MAX_SIMULATIONS),
            })
        } else {
            Ok(())
        }
    }

    /// Validate the number of time steps per path
    pub fn validate_steps(steps: usize) -> PricingResult<()> {
        if steps == 0 {
            Err(PricingError::InvalidParameter {
                parameter: "num_steps".to_string(),
                value: 0.0,
                constraint: "must be at least 1".to_string(),
            })
        } else if steps > MAX_STEPS {
            Err(PricingError::InvalidConfiguration {
                field: "num_steps".to_string(),
                reason: format!("exceeds maximum allowed ({})", MAX_STEPS),
            })
        } else {
            Ok(())
        }
    }

    /// Validate the size of the recorded path matrix
    pub fn validate_path_points(simulations: usize, steps: usize) -> PricingResult<()> {
        match simulations.checked_mul(steps.saturating_add(1)) {
            Some(points) if points <= MAX_PATH_POINTS => Ok(()),
            _ => Err(PricingError::InvalidConfiguration {
                field: "num_steps".to_string(),
                reason: format!(
                    "{} paths of {} steps exceed the maximum of {} recorded prices",
                    simulations, steps, MAX_PATH_POINTS
                ),
            }),
        }
    }
}
