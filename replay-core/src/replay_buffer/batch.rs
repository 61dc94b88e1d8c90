//! Transitions pushed into replay buffers and batches sampled from them.
use ndarray::Array2;

/// A single transition `(o_t, a_t, o_t+1, r_t, is_done_t)`.
///
/// Observations and actions are flattened; their lengths must match the
/// `obs_dim` and `act_dim` of the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation `o_t`.
    pub obs: Vec<f32>,

    /// Action `a_t`.
    pub act: Vec<f32>,

    /// Next observation `o_t+1`.
    pub next_obs: Vec<f32>,

    /// Reward `r_t`.
    pub reward: f32,

    /// Whether the episode ended at `o_t+1`.
    pub is_done: bool,
}

impl Transition {
    /// Constructs a transition.
    pub fn new(obs: Vec<f32>, act: Vec<f32>, next_obs: Vec<f32>, reward: f32, is_done: bool) -> Self {
        Self {
            obs,
            act,
            next_obs,
            reward,
            is_done,
        }
    }
}

/// A batch of transitions sampled from a replay buffer.
///
/// Each row of `obs`, `act` and `next_obs` corresponds to a sample.
#[derive(Debug, Clone)]
pub struct TransitionBatch {
    /// Observations.
    pub obs: Array2<f32>,

    /// Actions.
    pub act: Array2<f32>,

    /// Next observations.
    pub next_obs: Array2<f32>,

    /// Rewards. For n-step buffers, discounted sums of rewards.
    pub reward: Vec<f32>,

    /// Episode termination flags.
    pub is_done: Vec<i8>,

    /// Indices of the samples in the buffer, used for updating priorities.
    pub ix_sample: Vec<usize>,

    /// Importance weights, available for prioritized buffers.
    pub weight: Option<Vec<f32>>,

    /// Discount to apply to the bootstrapped value of `next_obs`,
    /// available for n-step buffers.
    pub discount: Option<Vec<f32>>,
}

impl TransitionBatch {
    /// Returns the number of samples in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch has no samples.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}
