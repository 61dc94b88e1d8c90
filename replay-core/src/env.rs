//! Spaces of environments.
use crate::{
    replay_buffer::{load_yaml, save_yaml},
    space::{BoxSpace, Space},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An environment exposing its observation and action spaces.
pub trait EnvSpaces {
    /// Space of observations.
    fn observation_space(&self) -> &Space;

    /// Space of actions.
    fn action_space(&self) -> &Space;
}

/// Observation and action spaces of an environment, loadable from a YAML file.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EnvSpec {
    /// Space of observations.
    pub observation_space: Space,

    /// Space of actions.
    pub action_space: Space,
}

impl EnvSpec {
    /// Creates a description of the spaces.
    pub fn new(observation_space: Space, action_space: Space) -> Self {
        Self {
            observation_space,
            action_space,
        }
    }

    /// Continuous observations and actions, both bounded in `[-1, 1]`.
    pub fn continuous(obs_dim: usize, act_dim: usize) -> Result<Self> {
        Ok(Self::new(
            Space::Box(BoxSpace::uniform(vec![obs_dim], -1.0, 1.0)?),
            Space::Box(BoxSpace::uniform(vec![act_dim], -1.0, 1.0)?),
        ))
    }

    /// Loads the spaces from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path)
    }

    /// Saves the spaces to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_yaml(self, path)
    }
}

impl EnvSpaces for EnvSpec {
    fn observation_space(&self) -> &Space {
        &self.observation_space
    }

    fn action_space(&self) -> &Space {
        &self.action_space
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_save_load() -> Result<()> {
        let spec = EnvSpec::new(
            Space::Box(BoxSpace::uniform(vec![4], -4.8, 4.8)?),
            Space::Discrete(2),
        );
        let dir = TempDir::new("env_spec")?;
        let path = dir.path().join("env.yaml");
        spec.save(&path)?;
        assert_eq!(EnvSpec::load(&path)?, spec);
        Ok(())
    }
}
