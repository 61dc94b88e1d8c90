//! Configurations of replay buffers.
use super::WeightNormalizer;
use crate::error::ReplayError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration shared by all replay buffers.
///
/// ```rust
/// use replay_core::replay_buffer::ReplayBufferConfig;
///
/// let config = ReplayBufferConfig::default()
///     .capacity(10_000)
///     .obs_dim(4)
///     .act_dim(1)
///     .seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// Maximum number of transitions. The oldest ones are overwritten when full.
    pub capacity: usize,

    /// Number of elements of an observation.
    pub obs_dim: usize,

    /// Number of elements of an action.
    pub act_dim: usize,

    /// Random seed used for sampling.
    pub seed: u64,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            obs_dim: 1,
            act_dim: 1,
            seed: 42,
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the dimension of observations.
    pub fn obs_dim(mut self, obs_dim: usize) -> Self {
        self.obs_dim = obs_dim;
        self
    }

    /// Sets the dimension of actions.
    pub fn act_dim(mut self, act_dim: usize) -> Self {
        self.act_dim = act_dim;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.capacity == 0 {
            return Err(ReplayError::InvalidConfig(
                "capacity must be positive".to_string(),
            ));
        }
        if self.obs_dim == 0 || self.act_dim == 0 {
            return Err(ReplayError::InvalidConfig(format!(
                "obs_dim and act_dim must be positive, got {} and {}",
                self.obs_dim, self.act_dim
            )));
        }

        // Largest array allocated by a buffer: the observation/action rows
        // and the `2 * capacity - 1` nodes of the sum tree.
        let dim = self.obs_dim.max(self.act_dim).max(2);
        let n_bytes = self
            .capacity
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()));
        match n_bytes {
            Some(n) if n <= isize::MAX as usize => Ok(()),
            _ => Err(ReplayError::InvalidConfig(format!(
                "capacity {} is too large for obs_dim={} and act_dim={}",
                self.capacity, self.obs_dim, self.act_dim
            ))),
        }
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_yaml(self, path)
    }
}

/// Configuration for prioritized experience replay.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PerConfig {
    /// Exponent for prioritization. 0 means uniform sampling.
    pub alpha: f32,

    /// Initial value of the exponent of importance weights.
    pub beta_0: f32,

    /// Final value of the exponent of importance weights.
    pub beta_final: f32,

    /// Number of priority updates after which `beta` reaches `beta_final`.
    pub n_opts_final: usize,

    /// Normalization of importance weights.
    pub normalize: WeightNormalizer,

    /// Small constant added to priorities to keep them positive.
    pub eps: f32,
}

impl Default for PerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            beta_0: 0.4,
            beta_final: 1.0,
            n_opts_final: 500_000,
            normalize: WeightNormalizer::All,
            eps: 1e-8,
        }
    }
}

impl PerConfig {
    /// Sets `alpha`.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets `beta_0`.
    pub fn beta_0(mut self, beta_0: f32) -> Self {
        self.beta_0 = beta_0;
        self
    }

    /// Sets `beta_final`.
    pub fn beta_final(mut self, beta_final: f32) -> Self {
        self.beta_final = beta_final;
        self
    }

    /// Sets `n_opts_final`.
    pub fn n_opts_final(mut self, n_opts_final: usize) -> Self {
        self.n_opts_final = n_opts_final;
        self
    }

    /// Sets the normalization of importance weights.
    pub fn normalize(mut self, normalize: WeightNormalizer) -> Self {
        self.normalize = normalize;
        self
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<(), ReplayError> {
        if !(self.alpha >= 0.0) || !(self.eps > 0.0) {
            return Err(ReplayError::InvalidConfig(format!(
                "alpha must be non-negative and eps positive, got {} and {}",
                self.alpha, self.eps
            )));
        }
        Ok(())
    }
}

/// Configuration of n-step return accumulation.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct NstepConfig {
    /// Number of steps accumulated into a transition.
    pub n_step: usize,

    /// Discount factor.
    pub discount: f32,
}

impl Default for NstepConfig {
    fn default() -> Self {
        Self {
            n_step: 4,
            discount: 0.99,
        }
    }
}

impl NstepConfig {
    /// Creates a configuration.
    pub fn new(n_step: usize, discount: f32) -> Self {
        Self { n_step, discount }
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.n_step == 0 {
            return Err(ReplayError::InvalidConfig(
                "n_step must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(ReplayError::InvalidConfig(format!(
                "discount must be in [0, 1], got {}",
                self.discount
            )));
        }
        Ok(())
    }
}

pub(crate) fn load_yaml<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let file = File::open(path)?;
    let rdr = BufReader::new(file);
    let b = serde_yaml::from_reader(rdr)?;
    Ok(b)
}

pub(crate) fn save_yaml<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(serde_yaml::to_string(value)?.as_bytes())?;
    Ok(())
}
