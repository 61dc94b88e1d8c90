//! Selection of a replay buffer suited to a policy.
use crate::{
    env::EnvSpaces,
    policy::PolicyBase,
    replay_buffer::{
        load_yaml, save_yaml, AnyReplayBuffer, NstepConfig, NstepPrioritizedReplayBuffer,
        NstepReplayBuffer, PerConfig, PlainReplayBuffer, PrioritizedReplayBuffer,
        ReplayBufferConfig,
    },
    space::space_size,
};
use anyhow::Result;
use clap::Args;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options of replay buffers given by users, typically on the command line.
#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayBufferArgs {
    /// Use prioritized experience replay
    #[arg(long, default_value_t = false)]
    pub use_prioritized_rb: bool,

    /// Use n-step experience replay
    #[arg(long, default_value_t = false)]
    pub use_nstep_rb: bool,

    /// Number of steps accumulated by n-step experience replay
    #[arg(long, default_value_t = 4)]
    pub n_step: usize,
}

impl Default for ReplayBufferArgs {
    fn default() -> Self {
        Self {
            use_prioritized_rb: false,
            use_nstep_rb: false,
            n_step: 4,
        }
    }
}

impl ReplayBufferArgs {
    /// Sets whether to use prioritized experience replay.
    pub fn use_prioritized_rb(mut self, v: bool) -> Self {
        self.use_prioritized_rb = v;
        self
    }

    /// Sets whether to use n-step experience replay.
    pub fn use_nstep_rb(mut self, v: bool) -> Self {
        self.use_nstep_rb = v;
        self
    }

    /// Sets the number of steps of n-step experience replay.
    pub fn n_step(mut self, v: usize) -> Self {
        self.n_step = v;
        self
    }
}

/// Parameters of replay buffers not derived from the policy or the environment.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SelectorConfig {
    /// Random seed for sampling.
    pub seed: u64,

    /// Configuration of prioritized variants.
    pub per_config: PerConfig,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            per_config: PerConfig::default(),
        }
    }
}

impl SelectorConfig {
    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the configuration of prioritized variants.
    pub fn per_config(mut self, per_config: PerConfig) -> Self {
        self.per_config = per_config;
        self
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

/// Builds a replay buffer for a policy with [`SelectorConfig::default()`].
///
/// See [`get_replay_buffer_with`].
pub fn get_replay_buffer(
    policy: &dyn PolicyBase,
    env: &dyn EnvSpaces,
    args: &ReplayBufferArgs,
) -> Result<AnyReplayBuffer> {
    get_replay_buffer_with(policy, env, args, &SelectorConfig::default())
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Builds a replay buffer for a policy.
///
/// Observations and actions are stored flattened; their dimensions are
/// given by [`space_size`] of the spaces of `env`. The variant and the
/// capacity are chosen as follows:
///
/// ```mermaid
/// graph TD
///     A{off-policy?} -->|no| B[Plain, capacity = update_interval]
///     A -->|yes| C{prioritized?}
///     C -->|yes| D{n-step?}
///     D -->|yes| E[NstepPrioritized]
///     D -->|no| F[Prioritized]
///     C -->|no| G{n-step?}
///     G -->|yes| H[Nstep]
///     G -->|no| I[Plain]
/// ```
///
/// Off-policy variants have capacity `memory_capacity`; n-step variants
/// accumulate `args.n_step` steps with the discount factor of the policy.
///
/// # Errors
///
/// Fails with [`ReplayError::UnsupportedSpace`](crate::error::ReplayError::UnsupportedSpace)
/// if a space is neither a box nor a discrete space, and with
/// [`ReplayError::InvalidConfig`](crate::error::ReplayError::InvalidConfig)
/// for a zero capacity or step count. The [`ReplayError`](crate::error::ReplayError)
/// can be recovered with [`anyhow::Error::downcast_ref`].
pub fn get_replay_buffer_with(
    policy: &dyn PolicyBase,
    env: &dyn EnvSpaces,
    args: &ReplayBufferArgs,
    config: &SelectorConfig,
) -> Result<AnyReplayBuffer> {
    let rb_config = ReplayBufferConfig::default()
        .obs_dim(space_size(env.observation_space())?)
        .act_dim(space_size(env.action_space())?)
        .capacity(policy.update_interval())
        .seed(config.seed);

    let off_policy = match policy.as_off_policy() {
        Some(off_policy) => off_policy,
        None => {
            let buffer = PlainReplayBuffer::build(&rb_config)?;
            info!(
                "On-policy agent: ReplayBuffer with capacity {} (obs_dim={}, act_dim={})",
                rb_config.capacity, rb_config.obs_dim, rb_config.act_dim
            );
            return Ok(buffer.into());
        }
    };

    let rb_config = rb_config.capacity(off_policy.memory_capacity());
    let nstep_config = NstepConfig::new(args.n_step, off_policy.discount());
    let per_config = &config.per_config;

    let buffer: AnyReplayBuffer = match (args.use_prioritized_rb, args.use_nstep_rb) {
        (true, true) => NstepPrioritizedReplayBuffer::build(&rb_config, per_config, &nstep_config)?.into(),
        (true, false) => PrioritizedReplayBuffer::build(&rb_config, per_config)?.into(),
        (false, true) => NstepReplayBuffer::build(&rb_config, &nstep_config)?.into(),
        (false, false) => PlainReplayBuffer::build(&rb_config)?.into(),
    };

    match buffer.nstep_config() {
        Some(c) => info!(
            "Off-policy agent: {} with capacity {} (obs_dim={}, act_dim={}, n_step={}, discount={})",
            buffer.kind(),
            rb_config.capacity,
            rb_config.obs_dim,
            rb_config.act_dim,
            c.n_step,
            c.discount
        ),
        None => info!(
            "Off-policy agent: {} with capacity {} (obs_dim={}, act_dim={})",
            buffer.kind(),
            rb_config.capacity,
            rb_config.obs_dim,
            rb_config.act_dim
        ),
    }

    Ok(buffer)
}
