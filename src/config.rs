//! Run configuration loaded from TOML
//!
//! ```toml
//! seed = 42
//! parallel = false
//! histogram_bins = 50
//!
//! [simulation]
//! initial_price = 100.0
//! strike_price = 105.0
//! volatility = 0.25
//! num_simulations = 50000
//! option_type = "put"
//! ```
//!
//! Every key is optional; missing ones take the defaults of
//! [`SimulationParameters`].

use crate::analytics::histogram::DEFAULT_BINS;
use crate::error::{PricingError, PricingResult};
use crate::mc::mc_engine::SimulationParameters;
use crate::rng::DEFAULT_SEED;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub seed: u64,
    pub parallel: bool,
    pub histogram_bins: usize,
    pub simulation: SimulationParameters,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            seed: DEFAULT_SEED,
            parallel: false,
            histogram_bins: DEFAULT_BINS,
            simulation: SimulationParameters::default(),
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(content: &str) -> PricingResult<Self> {
        toml::from_str(content).map_err(|e| PricingError::ConfigFile {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a TOML file. The simulation parameters are not
    /// validated here; the engine does that on every run.
    pub fn load<P: AsRef<Path>>(path: P) -> PricingResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| PricingError::ConfigFile {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;
        let config: RunConfig = toml::from_str(&content).map_err(|e| PricingError::ConfigFile {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;
        debug!(path = %path_str, ?config, "loaded run configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::payoffs::OptionType;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(RunConfig::from_toml_str("").unwrap(), RunConfig::default());
    }

    #[test]
    fn test_partial_simulation_table() {
        let config = RunConfig::from_toml_str(
            r#"
            seed = 7
            [simulation]
            strike_price = 105.0
            option_type = "put"
            num_steps = 52
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert!(!config.parallel);
        assert_eq!(config.simulation.strike_price, 105.0);
        assert_eq!(config.simulation.option_type, OptionType::Put);
        assert_eq!(config.simulation.num_steps, 52);
        assert_eq!(config.simulation.initial_price, 100.0);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = RunConfig::from_toml_str("seeed = 1").unwrap_err();
        assert!(matches!(err, PricingError::ConfigFile { .. }));
    }

    #[test]
    fn test_unknown_simulation_key_rejected() {
        let err = RunConfig::from_toml_str("[simulation]\nvolatilty = 0.9\n").unwrap_err();
        match err {
            PricingError::ConfigFile { reason, .. } => assert!(reason.contains("volatilty")),
            other => panic!("expected ConfigFile, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = RunConfig::load("/definitely/not/here.toml").unwrap_err();
        assert_eq!(err.field(), "/definitely/not/here.toml");
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("run.toml");
        std::fs::write(&file, "parallel = true\n[simulation]\nvolatility = 0.3\n").unwrap();

        let config = RunConfig::load(&file).unwrap();
        assert!(config.parallel);
        assert_eq!(config.simulation.volatility, 0.3);
    }
}
