use std::path::Path;

use dimer_core::{ErrorInfo, Point, TilingError};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters of a sampling session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Move selection and exactness mode.
    #[serde(default)]
    pub mode: SamplingMode,
    /// Orientation weights of the faces.
    #[serde(default)]
    pub bias: BiasConfig,
    /// Master seed and labelling.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Coupling-from-the-past settings.
    #[serde(default)]
    pub cftp: CftpConfig,
    /// Number of single-face steps run by preview sampling.
    #[serde(default = "default_preview_steps")]
    pub preview_steps: u64,
    /// Search radius around a hole used when rerouting its winding.
    #[serde(default = "default_winding_band")]
    pub winding_band: usize,
    /// Search radius around edited cells used by local repair.
    #[serde(default = "default_repair_radius")]
    pub repair_radius: usize,
}

fn default_preview_steps() -> u64 {
    10_000
}

fn default_winding_band() -> usize {
    2
}

fn default_repair_radius() -> usize {
    4
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            mode: SamplingMode::default(),
            bias: BiasConfig::default(),
            seed_policy: SeedPolicy::default(),
            cftp: CftpConfig::default(),
            preview_steps: default_preview_steps(),
            winding_band: default_winding_band(),
            repair_radius: default_repair_radius(),
        }
    }
}

impl SamplerConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, TilingError> {
        let config: SamplerConfig = serde_yaml::from_str(contents).map_err(|err| {
            TilingError::Serde(ErrorInfo::new("yaml_deserialize", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    pub fn load(path: &Path) -> Result<Self, TilingError> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            TilingError::Serde(
                ErrorInfo::new("config_read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Serialises the configuration to YAML.
    pub fn to_yaml_string(&self) -> Result<String, TilingError> {
        serde_yaml::to_string(self)
            .map_err(|err| TilingError::Serde(ErrorInfo::new("yaml_serialize", err.to_string())))
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), TilingError> {
        self.bias.validate()?;
        if self.cftp.max_epochs == 0 {
            return Err(TilingError::invalid(
                "bad-epoch-budget",
                "cftp.max_epochs must be positive",
            ));
        }
        Ok(())
    }
}

/// How moves are scheduled and whether the result is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingMode {
    /// Approximate Glauber dynamics from a max-flow seed.
    Preview,
    /// Exact sampling with a single-face coupling.
    #[default]
    CftpSerial,
    /// Exact sampling with batched parallel updates.
    CftpParallel,
}

/// Weight of the up orientation of each face relative to the down orientation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BiasConfig {
    /// Every tiling equally likely.
    #[default]
    Uniform,
    /// The same weight `q` everywhere.
    Scalar {
        /// Up/down weight ratio.
        q: f64,
    },
    /// A `period × period` table indexed by the face centre modulo the period.
    Periodic {
        /// Table side length.
        period: usize,
        /// Row-major weights; entry `(x mod k) * k + (y mod k)`.
        table: Vec<f64>,
    },
}

impl BiasConfig {
    /// Rejects non-positive or non-finite weights and malformed tables.
    pub fn validate(&self) -> Result<(), TilingError> {
        let bad_weight = |q: f64| !(q.is_finite() && q > 0.0);
        match self {
            BiasConfig::Uniform => Ok(()),
            BiasConfig::Scalar { q } if bad_weight(*q) => Err(TilingError::InvalidInput(
                ErrorInfo::new("bad-bias", "scalar weight must be positive and finite")
                    .with_context("q", q),
            )),
            BiasConfig::Scalar { .. } => Ok(()),
            BiasConfig::Periodic { period, table } => {
                if *period == 0 || table.len() != period * period {
                    return Err(TilingError::InvalidInput(
                        ErrorInfo::new("bad-bias", "periodic table must hold period² entries")
                            .with_context("period", period)
                            .with_context("entries", table.len()),
                    ));
                }
                if let Some((idx, q)) = table.iter().enumerate().find(|(_, q)| bad_weight(**q)) {
                    return Err(TilingError::InvalidInput(
                        ErrorInfo::new("bad-bias", "periodic weights must be positive and finite")
                            .with_context("index", idx)
                            .with_context("q", q),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Weight ratio at a face centred on `point`.
    pub fn q_at(&self, point: Point) -> f64 {
        match self {
            BiasConfig::Uniform => 1.0,
            BiasConfig::Scalar { q } => *q,
            BiasConfig::Periodic { period, table } => {
                let k = *period as i32;
                let row = point.x.rem_euclid(k) as usize;
                let col = point.y.rem_euclid(k) as usize;
                table[row * period + col]
            }
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed for every random stream of the session.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional free-form label carried into outputs.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Coupling-from-the-past parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CftpConfig {
    /// Epochs allowed per `run_until_exact` call.
    #[serde(default = "default_max_epochs")]
    pub max_epochs: usize,
    /// Length of the first block; `0` uses the number of faces.
    #[serde(default)]
    pub initial_block: u64,
    /// Worker threads for the parallel coupling; `0` uses the rayon default.
    #[serde(default)]
    pub threads: usize,
}

fn default_max_epochs() -> usize {
    24
}

impl Default for CftpConfig {
    fn default() -> Self {
        Self {
            max_epochs: default_max_epochs(),
            initial_block: 0,
            threads: 0,
        }
    }
}
