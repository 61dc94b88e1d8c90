//! Configuration of the demo.
use anyhow::Result;
use replay_core::{EnvSpec, PolicyConfig, SelectorConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

const DIM_OBS: usize = 3;
const DIM_ACT: usize = 3;
const MEMORY_CAPACITY: usize = 10;
const DISCOUNT_FACTOR: f32 = 0.99;

/// Policy and environment for which a replay buffer is built.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DemoConfig {
    pub policy: PolicyConfig,
    pub env: EnvSpec,
    #[serde(default)]
    pub selector: SelectorConfig,
}

impl DemoConfig {
    /// Off-policy agent on continuous observations and actions.
    pub fn new() -> Result<Self> {
        Ok(Self {
            policy: PolicyConfig::off_policy(1, MEMORY_CAPACITY, DISCOUNT_FACTOR),
            env: EnvSpec::continuous(DIM_OBS, DIM_ACT)?,
            selector: SelectorConfig::default(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
