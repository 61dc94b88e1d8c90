//! Replay buffers.
//!
//! Four variants are provided, all implementing [`ReplayBuffer`]:
//!
//! - [`PlainReplayBuffer`]: uniform sampling of single-step transitions.
//! - [`PrioritizedReplayBuffer`]: proportional prioritized experience replay.
//! - [`NstepReplayBuffer`]: uniform sampling of n-step transitions.
//! - [`NstepPrioritizedReplayBuffer`]: prioritized sampling of n-step transitions.
//!
//! [`AnyReplayBuffer`] holds one of them and is what
//! [`get_replay_buffer`](crate::get_replay_buffer) returns.
mod base;
mod batch;
mod config;
mod nstep;
mod plain;
mod prioritized;
mod storage;
pub use base::{AnyReplayBuffer, NstepTarget, ReplayBuffer, ReplayBufferKind};
pub use batch::{Transition, TransitionBatch};
pub use config::{NstepConfig, PerConfig, ReplayBufferConfig};
pub(crate) use config::{load_yaml, save_yaml};
pub use nstep::{NstepBuffer, NstepPrioritizedReplayBuffer, NstepReplayBuffer};
pub use plain::PlainReplayBuffer;
pub use prioritized::{IwScheduler, PrioritizedReplayBuffer, WeightNormalizer};
