//! Replay buffer with uniform sampling.
use super::{
    storage::RingStorage, NstepTarget, ReplayBuffer, ReplayBufferConfig, Transition,
    TransitionBatch,
};
use crate::error::ReplayError;
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Replay buffer with uniform sampling.
///
/// ```rust
/// use replay_core::replay_buffer::{
///     PlainReplayBuffer, ReplayBuffer, ReplayBufferConfig, Transition,
/// };
///
/// let config = ReplayBufferConfig::default().capacity(10).obs_dim(3).act_dim(3);
/// let mut buffer = PlainReplayBuffer::build(&config)?;
/// for i in 0..10 {
///     let v = vec![i as f32; 3];
///     buffer.push(Transition::new(v.clone(), v.clone(), v, i as f32, false))?;
/// }
/// let batch = buffer.batch(4)?;
/// assert_eq!(batch.obs.shape(), &[4, 3]);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct PlainReplayBuffer {
    storage: RingStorage,
    rng: StdRng,
}

impl PlainReplayBuffer {
    /// Builds a buffer.
    pub fn build(config: &ReplayBufferConfig) -> Result<Self> {
        Self::build_with_discount(config, false)
    }

    pub(super) fn build_with_discount(
        config: &ReplayBufferConfig,
        store_discount: bool,
    ) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "Build replay buffer: capacity={}, obs_dim={}, act_dim={}",
            config.capacity,
            config.obs_dim,
            config.act_dim
        );
        Ok(Self {
            storage: RingStorage::new(
                config.capacity,
                config.obs_dim,
                config.act_dim,
                store_discount,
            ),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }
}

impl ReplayBuffer for PlainReplayBuffer {
    fn push(&mut self, tr: Transition) -> Result<()> {
        self.storage.push(tr)?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.storage.len()
    }

    fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    fn obs_dim(&self) -> usize {
        self.storage.obs_dim()
    }

    fn act_dim(&self) -> usize {
        self.storage.act_dim()
    }

    fn batch(&mut self, size: usize) -> Result<TransitionBatch> {
        let len = self.storage.len();
        if len == 0 {
            return Err(ReplayError::EmptyBuffer.into());
        }
        let ixs = (0..size)
            .map(|_| self.rng.gen_range(0..len))
            .collect::<Vec<_>>();
        Ok(self.storage.sample(ixs))
    }

    fn update_priority(&mut self, _ixs: &[usize], _td_errs: &[f32]) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self) {
        self.storage.clear();
    }
}

impl NstepTarget for PlainReplayBuffer {
    fn push_discounted(&mut self, tr: Transition, discount: f32) -> Result<()> {
        self.storage.push_discounted(tr, discount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(capacity: usize) -> Result<PlainReplayBuffer> {
        let config = ReplayBufferConfig::default()
            .capacity(capacity)
            .obs_dim(2)
            .act_dim(1);
        PlainReplayBuffer::build(&config)
    }

    #[test]
    fn test_empty_batch() -> Result<()> {
        let mut buffer = build(4)?;
        assert!(buffer.is_empty());
        let err = buffer.batch(2).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ReplayError>(),
            Some(&ReplayError::EmptyBuffer)
        );
        Ok(())
    }

    #[test]
    fn test_samples_within_len() -> Result<()> {
        let mut buffer = build(8)?;
        for i in 0..3 {
            let v = i as f32;
            buffer.push(Transition::new(vec![v; 2], vec![v], vec![v; 2], v, i == 2))?;
        }
        let batch = buffer.batch(64)?;
        assert_eq!(batch.len(), 64);
        assert!(batch.ix_sample.iter().all(|&ix| ix < 3));
        assert!(batch.weight.is_none());
        assert!(batch.discount.is_none());
        for (ix, r) in batch.ix_sample.iter().zip(batch.reward.iter()) {
            assert_eq!(*ix as f32, *r);
        }
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let mut buffer = build(2)?;
        buffer.push(Transition::new(vec![0.0; 2], vec![0.0], vec![0.0; 2], 0.0, false))?;
        buffer.clear();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 2);
        Ok(())
    }

    #[test]
    fn test_zero_capacity() {
        assert!(build(0).is_err());
    }
}
