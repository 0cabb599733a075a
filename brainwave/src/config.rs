//! TOML configuration.
//!
//! Every section is optional; missing sections and keys take their defaults.
//!
//! ```toml
//! [engine]
//! backend = "lwe"
//!
//! [engine.parameters]
//! lwe_dimension = 630
//! noise_precision = 17
//! sigma = 3.2
//! secret = { kind = "binary_prob", param = 0.5 }
//! glwe_degree = 1024
//! glwe_noise_precision = 27
//! max_width = 32
//!
//! [[inputset.samples]]
//! powers = [10.0, 6.0, 40.0]
//! frequencies = [2.0, 6.0, 40.0]
//!
//! [input]
//! range_policy = "reject"
//! powers = [10.0, 25.0, 40.0]
//! frequencies = [2.0, 10.0, 40.0]
//!
//! [log]
//! level = "info"
//! format = "json"
//! ```

use std::{fs, io, path::Path};

use engine::Parameters;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    error::InvalidInput,
    logging::{LogConfig, parse_level},
    samples::{RangePolicy, SampleSet},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Lwe,
    Simulation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub backend: BackendKind,
    pub parameters: Parameters,
}

/// One representative sample, in the same units as the classified input.
/// Values are scaled without range checks so the extremes of the domain can be
/// provisioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HzSample {
    pub powers: Vec<f64>,
    pub frequencies: Vec<f64>,
}

impl HzSample {
    pub fn new(powers: &[f64], frequencies: &[f64]) -> Self {
        Self {
            powers: powers.to_vec(),
            frequencies: frequencies.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsetConfig {
    pub samples: Vec<HzSample>,
}

impl Default for InputsetConfig {
    fn default() -> Self {
        Self {
            samples: vec![
                HzSample::new(&[10.0, 6.0, 40.0], &[2.0, 6.0, 40.0]),
                HzSample::new(&[20.0, 30.0, 50.0], &[5.0, 10.0, 20.0]),
                HzSample::new(&[0.0; 3], &[0.0; 3]),
                HzSample::new(&[100.0; 3], &[100.0; 3]),
            ],
        }
    }
}

impl InputsetConfig {
    /// Scaled samples, in order.
    pub fn sample_sets(&self) -> Result<Vec<SampleSet>, InvalidInput> {
        self.samples
            .iter()
            .map(|sample| SampleSet::from_hz(&sample.powers, &sample.frequencies, RangePolicy::Passthrough))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub range_policy: RangePolicy,
    pub powers: Vec<f64>,
    pub frequencies: Vec<f64>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::Reject,
            powers: vec![10.0, 25.0, 40.0],
            frequencies: vec![2.0, 10.0, 40.0],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub engine: EngineConfig,
    pub inputset: InputsetConfig,
    pub input: InputConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path: &Path = path.as_ref();
        let text: String = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .parameters
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("engine.parameters: {e}")))?;

        let inputset: Vec<SampleSet> = self
            .inputset
            .sample_sets()
            .map_err(|e| ConfigError::Invalid(format!("inputset: {e}")))?;
        let first: &SampleSet = inputset
            .first()
            .ok_or_else(|| ConfigError::Invalid("inputset has no samples".to_string()))?;
        if let Some(i) = inputset.iter().position(|s| s.len() != first.len()) {
            return Err(ConfigError::Invalid(format!(
                "inputset sample {i} has {} values, sample 0 has {}",
                inputset[i].len(),
                first.len()
            )));
        }

        parse_level(&self.log.level).map_err(|e| ConfigError::Invalid(format!("log.level: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use engine::{Degree, Distribution};

    #[test]
    fn defaults_are_valid() {
        let config: Config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.engine.backend, BackendKind::Lwe);
        assert_eq!(config.engine.parameters, Parameters::default());
        assert_eq!(config.inputset.samples.len(), 4);
        assert_eq!(config.input.range_policy, RangePolicy::Reject);
    }

    #[test]
    fn default_inputset_spans_the_scaled_domain() {
        let inputset: Vec<SampleSet> = Config::default().inputset.sample_sets().unwrap();
        let values: Vec<i64> = inputset
            .iter()
            .flat_map(|s| s.powers().iter().chain(s.frequencies()))
            .copied()
            .collect();
        assert_eq!(values.iter().min(), Some(&0));
        assert_eq!(values.iter().max(), Some(&65535));
    }

    #[test]
    fn toml_round_trip() {
        let mut config: Config = Config::default();
        config.engine.backend = BackendKind::Simulation;
        config.log.format = LogFormat::Json;
        let text: String = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = Config::from_toml_str(
            r#"
            [engine]
            backend = "simulation"

            [engine.parameters]
            lwe_dimension = 256
            secret = { kind = "binary_fixed", param = 128 }

            [input]
            range_policy = "passthrough"
            powers = [1.0, 2.0]
            frequencies = [3.0, 4.0]

            [[inputset.samples]]
            powers = [0.0, 0.0]
            frequencies = [100.0, 100.0]
            "#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.engine.backend, BackendKind::Simulation);
        assert_eq!(config.engine.parameters.lwe_dimension, Degree(256));
        assert_eq!(config.engine.parameters.secret, Distribution::BinaryFixed(128));
        assert_eq!(config.engine.parameters.noise_precision, Parameters::default().noise_precision);
        assert_eq!(config.input.range_policy, RangePolicy::Passthrough);
        assert_eq!(config.inputset.samples.len(), 1);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("[engine]\nbackend = \"lwe\"\nthreads = 4\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[engine]\nbackend = \"quantum\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut config: Config = Config::default();
        config.inputset.samples.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config: Config = Config::default();
        config.inputset.samples.push(HzSample::new(&[1.0, 2.0], &[1.0, 2.0]));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config: Config = Config::default();
        config.inputset.samples[0].frequencies.pop();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config: Config = Config::default();
        config.engine.parameters.lwe_dimension = Degree(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config: Config = Config::default();
        config.log.level = "brainwave=loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            Config::load("/nonexistent/brainwave.toml"),
            Err(ConfigError::Read { .. })
        ));
    }
}
