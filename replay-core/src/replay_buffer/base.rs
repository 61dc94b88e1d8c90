//! Interface of replay buffers.
use super::{
    NstepConfig, NstepPrioritizedReplayBuffer, NstepReplayBuffer, PerConfig, PlainReplayBuffer,
    PrioritizedReplayBuffer, Transition, TransitionBatch,
};
use anyhow::Result;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface of replay buffers storing transitions and sampling batches for training.
#[enum_dispatch]
pub trait ReplayBuffer {
    /// Pushes a transition.
    ///
    /// Buffers accumulating n-step returns may keep the transition pending
    /// until enough steps arrive or the episode ends.
    fn push(&mut self, tr: Transition) -> Result<()>;

    /// Number of transitions available for sampling.
    fn len(&self) -> usize;

    /// Returns `true` if no transition can be sampled.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of stored transitions.
    fn capacity(&self) -> usize;

    /// Number of elements of an observation.
    fn obs_dim(&self) -> usize;

    /// Number of elements of an action.
    fn act_dim(&self) -> usize;

    /// Samples a batch of `size` transitions, with replacement.
    fn batch(&mut self, size: usize) -> Result<TransitionBatch>;

    /// Updates priorities of the transitions at `ixs` with TD errors.
    ///
    /// Buffers without prioritization ignore the call.
    fn update_priority(&mut self, ixs: &[usize], td_errs: &[f32]) -> Result<()>;

    /// Notifies the end of an episode.
    fn on_episode_end(&mut self) -> Result<()>;

    /// Removes all transitions.
    fn clear(&mut self);
}

/// Buffers that n-step accumulation can store into.
pub trait NstepTarget: ReplayBuffer {
    /// Pushes a transition together with the discount of its bootstrapped value.
    fn push_discounted(&mut self, tr: Transition, discount: f32) -> Result<()>;
}

/// Variants of replay buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayBufferKind {
    /// Uniform sampling of single-step transitions.
    Plain,

    /// Proportional prioritized sampling.
    Prioritized,

    /// Uniform sampling of n-step transitions.
    Nstep,

    /// Proportional prioritized sampling of n-step transitions.
    NstepPrioritized,
}

impl fmt::Display for ReplayBufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plain => "ReplayBuffer",
            Self::Prioritized => "PrioritizedReplayBuffer",
            Self::Nstep => "NstepReplayBuffer",
            Self::NstepPrioritized => "NstepPrioritizedReplayBuffer",
        };
        write!(f, "{}", s)
    }
}

/// One of the replay buffers of this crate.
#[enum_dispatch(ReplayBuffer)]
pub enum AnyReplayBuffer {
    /// Plain buffer.
    PlainReplayBuffer,

    /// Prioritized buffer.
    PrioritizedReplayBuffer,

    /// N-step buffer.
    NstepReplayBuffer,

    /// N-step prioritized buffer.
    NstepPrioritizedReplayBuffer,
}

impl AnyReplayBuffer {
    /// Returns the variant.
    pub fn kind(&self) -> ReplayBufferKind {
        match self {
            Self::PlainReplayBuffer(_) => ReplayBufferKind::Plain,
            Self::PrioritizedReplayBuffer(_) => ReplayBufferKind::Prioritized,
            Self::NstepReplayBuffer(_) => ReplayBufferKind::Nstep,
            Self::NstepPrioritizedReplayBuffer(_) => ReplayBufferKind::NstepPrioritized,
        }
    }

    /// Returns the n-step configuration of n-step variants.
    pub fn nstep_config(&self) -> Option<&NstepConfig> {
        match self {
            Self::NstepReplayBuffer(b) => Some(b.nstep_config()),
            Self::NstepPrioritizedReplayBuffer(b) => Some(b.nstep_config()),
            _ => None,
        }
    }

    /// Returns the PER configuration of prioritized variants.
    pub fn per_config(&self) -> Option<&PerConfig> {
        match self {
            Self::PrioritizedReplayBuffer(b) => Some(b.per_config()),
            Self::NstepPrioritizedReplayBuffer(b) => Some(b.inner().per_config()),
            _ => None,
        }
    }
}

impl fmt::Debug for AnyReplayBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyReplayBuffer")
            .field("kind", &self.kind())
            .field("capacity", &self.capacity())
            .field("obs_dim", &self.obs_dim())
            .field("act_dim", &self.act_dim())
            .field("len", &self.len())
            .field("nstep", &self.nstep_config())
            .finish()
    }
}
