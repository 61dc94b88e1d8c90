#![warn(missing_docs)]
//! Replay buffers for reinforcement learning and their selection.
//!
//! [`get_replay_buffer`] builds a replay buffer suited to a policy: a buffer
//! holding one update interval of transitions for on-policy agents, and a
//! plain, prioritized, n-step or n-step prioritized buffer of
//! `memory_capacity` transitions for off-policy agents.
//!
//! ```rust
//! use replay_core::{
//!     get_replay_buffer, BoxSpace, EnvSpec, PolicyConfig, ReplayBufferArgs,
//!     ReplayBufferKind, Space,
//! };
//!
//! let env = EnvSpec::new(
//!     Space::Box(BoxSpace::uniform(vec![3], -1.0, 1.0)?),
//!     Space::Discrete(4),
//! );
//! let policy = PolicyConfig::off_policy(1, 1000, 0.99);
//! let args = ReplayBufferArgs::default().use_nstep_rb(true).n_step(3);
//!
//! let buffer = get_replay_buffer(&policy, &env, &args)?;
//! assert_eq!(buffer.kind(), ReplayBufferKind::Nstep);
//! # Ok::<(), anyhow::Error>(())
//! ```
pub mod error;
pub mod replay_buffer;

mod env;
pub use env::{EnvSpaces, EnvSpec};

mod policy;
pub use policy::{OffPolicyAgent, OffPolicyConfig, PolicyBase, PolicyConfig};

mod selector;
pub use selector::{get_replay_buffer, get_replay_buffer_with, ReplayBufferArgs, SelectorConfig};

mod space;
pub use space::{space_size, BoxSpace, Space};

pub use replay_buffer::{AnyReplayBuffer, ReplayBuffer, ReplayBufferKind};
