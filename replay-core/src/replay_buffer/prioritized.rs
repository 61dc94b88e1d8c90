//! Replay buffer with proportional prioritized sampling.
mod iw_scheduler;
mod sum_tree;
use super::{
    storage::RingStorage, NstepTarget, PerConfig, ReplayBuffer, ReplayBufferConfig, Transition,
    TransitionBatch,
};
use crate::error::ReplayError;
use anyhow::Result;
pub use iw_scheduler::IwScheduler;
use rand::{rngs::StdRng, SeedableRng};
use sum_tree::SumTree;
pub use sum_tree::WeightNormalizer;

/// Replay buffer with proportional prioritized sampling.
///
/// New transitions get the largest priority seen so far. Priorities are
/// updated with TD errors through [`ReplayBuffer::update_priority`], each call
/// of which advances the schedule of the exponent of importance weights.
pub struct PrioritizedReplayBuffer {
    storage: RingStorage,
    sum_tree: SumTree,
    iw_scheduler: IwScheduler,
    per_config: PerConfig,
    rng: StdRng,
}

impl PrioritizedReplayBuffer {
    /// Builds a buffer.
    pub fn build(config: &ReplayBufferConfig, per_config: &PerConfig) -> Result<Self> {
        Self::build_with_discount(config, per_config, false)
    }

    pub(super) fn build_with_discount(
        config: &ReplayBufferConfig,
        per_config: &PerConfig,
        store_discount: bool,
    ) -> Result<Self> {
        config.validate()?;
        per_config.validate()?;
        log::debug!(
            "Build prioritized replay buffer: capacity={}, obs_dim={}, act_dim={}, {:?}",
            config.capacity,
            config.obs_dim,
            config.act_dim,
            per_config
        );
        Ok(Self {
            storage: RingStorage::new(
                config.capacity,
                config.obs_dim,
                config.act_dim,
                store_discount,
            ),
            sum_tree: Self::sum_tree(config.capacity, per_config),
            iw_scheduler: IwScheduler::new(per_config),
            per_config: per_config.clone(),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    fn sum_tree(capacity: usize, per_config: &PerConfig) -> SumTree {
        SumTree::new(
            capacity,
            per_config.alpha,
            per_config.eps,
            per_config.normalize,
        )
    }

    /// Returns the PER configuration.
    pub fn per_config(&self) -> &PerConfig {
        &self.per_config
    }

    /// Current exponent of importance weights.
    pub fn beta(&self) -> f32 {
        self.iw_scheduler.beta()
    }

    fn set_priority(&mut self, ix: usize) {
        let max_p = self.sum_tree.max_priority();
        self.sum_tree.add(ix, max_p);
    }
}

impl ReplayBuffer for PrioritizedReplayBuffer {
    fn push(&mut self, tr: Transition) -> Result<()> {
        self.push_discounted(tr, 1.0)
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
        if self.storage.len() == 0 {
            return Err(ReplayError::EmptyBuffer.into());
        }
        let beta = self.iw_scheduler.beta();
        let (ixs, weight) = self.sum_tree.sample(size, beta, &mut self.rng);
        let mut batch = self.storage.sample(ixs);
        batch.weight = Some(weight);
        Ok(batch)
    }

    fn update_priority(&mut self, ixs: &[usize], td_errs: &[f32]) -> Result<()> {
        if ixs.len() != td_errs.len() {
            return Err(ReplayError::PriorityLengthMismatch {
                ixs: ixs.len(),
                td_errs: td_errs.len(),
            }
            .into());
        }
        let len = self.storage.len();
        if let Some(&ix) = ixs.iter().find(|&&ix| ix >= len) {
            return Err(ReplayError::IndexOutOfRange { ix, len }.into());
        }
        for (&ix, &td_err) in ixs.iter().zip(td_errs.iter()) {
            self.sum_tree.update(ix, td_err);
        }
        self.iw_scheduler.step();
        log::trace!(
            "Updated {} priorities, beta={}",
            ixs.len(),
            self.iw_scheduler.beta()
        );
        Ok(())
    }

    fn on_episode_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self) {
        self.storage.clear();
        self.sum_tree = Self::sum_tree(self.storage.capacity(), &self.per_config);
    }
}

impl NstepTarget for PrioritizedReplayBuffer {
    fn push_discounted(&mut self, tr: Transition, discount: f32) -> Result<()> {
        let ix = self.storage.push_discounted(tr, discount)?;
        self.set_priority(ix);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(v: f32) -> Transition {
        Transition::new(vec![v; 2], vec![v], vec![v; 2], v, false)
    }

    fn build(capacity: usize, per_config: &PerConfig) -> Result<PrioritizedReplayBuffer> {
        let config = ReplayBufferConfig::default()
            .capacity(capacity)
            .obs_dim(2)
            .act_dim(1)
            .seed(0);
        PrioritizedReplayBuffer::build(&config, per_config)
    }

    #[test]
    fn test_new_transitions_are_uniform() -> Result<()> {
        let mut buffer = build(4, &PerConfig::default())?;
        for i in 0..4 {
            buffer.push(tr(i as f32))?;
        }
        let batch = buffer.batch(16)?;
        let weight = batch.weight.expect("weights of prioritized buffer");
        assert!(weight.iter().all(|&w| (w - 1.0).abs() < 1e-5));
        assert!(batch.ix_sample.iter().all(|&ix| ix < 4));
        Ok(())
    }

    #[test]
    fn test_update_priority_biases_sampling() -> Result<()> {
        let per_config = PerConfig::default().alpha(1.0);
        let mut buffer = build(8, &per_config)?;
        for i in 0..4 {
            buffer.push(tr(i as f32))?;
        }
        buffer.update_priority(&[0, 1, 2, 3], &[0.01, 0.01, 0.01, 10.0])?;
        let batch = buffer.batch(1000)?;
        let n3 = batch.ix_sample.iter().filter(|&&ix| ix == 3).count();
        assert!(n3 > 900, "{}", n3);

        // Frequently sampled transitions have small weights.
        let weight = batch.weight.expect("weights of prioritized buffer");
        for (&ix, &w) in batch.ix_sample.iter().zip(weight.iter()) {
            assert!(w > 0.0 && w <= 1.0 + 1e-5);
            if ix == 3 {
                assert!(w < 0.1);
            }
        }
        Ok(())
    }

    #[test]
    fn test_new_transition_gets_max_priority() -> Result<()> {
        let per_config = PerConfig::default();
        let mut buffer = build(4, &per_config)?;
        buffer.push(tr(0.0))?;
        buffer.push(tr(1.0))?;
        buffer.update_priority(&[0], &[10.0])?;
        buffer.push(tr(2.0))?;

        let expected = (10.0f32 + per_config.eps).powf(per_config.alpha);
        assert!((buffer.sum_tree.leaf(2) - expected).abs() < 1e-5);
        assert!((buffer.sum_tree.leaf(0) - expected).abs() < 1e-5);
        assert!(buffer.sum_tree.leaf(1) < expected);
        Ok(())
    }

    #[test]
    fn test_overwritten_slot_gets_max_priority() -> Result<()> {
        let per_config = PerConfig::default();
        let mut buffer = build(2, &per_config)?;
        buffer.push(tr(0.0))?;
        buffer.push(tr(1.0))?;
        buffer.update_priority(&[0, 1], &[0.5, 2.0])?;

        // Wraps around and replaces the transition at index 0.
        buffer.push(tr(2.0))?;
        assert_eq!(buffer.len(), 2);
        let expected = (2.0f32 + per_config.eps).powf(per_config.alpha);
        assert!((buffer.sum_tree.leaf(0) - expected).abs() < 1e-5);

        let batch = buffer.batch(64)?;
        assert!(batch.ix_sample.iter().all(|&ix| ix < 2));
        let weight = batch.weight.expect("weights of prioritized buffer");
        assert!(weight.iter().all(|&w| w > 0.0 && w <= 1.0 + 1e-5), "{:?}", weight);
        for (&ix, &r) in batch.ix_sample.iter().zip(batch.reward.iter()) {
            assert_eq!(r, if ix == 0 { 2.0 } else { 1.0 });
        }
        Ok(())
    }

    #[test]
    fn test_update_priority_errors() -> Result<()> {
        let mut buffer = build(4, &PerConfig::default())?;
        buffer.push(tr(0.0))?;
        let err = buffer.update_priority(&[0], &[]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ReplayError>(),
            Some(&ReplayError::PriorityLengthMismatch { ixs: 1, td_errs: 0 })
        );
        let err = buffer.update_priority(&[1], &[0.5]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ReplayError>(),
            Some(&ReplayError::IndexOutOfRange { ix: 1, len: 1 })
        );
        Ok(())
    }

    #[test]
    fn test_beta_schedule_advances() -> Result<()> {
        let per_config = PerConfig::default().n_opts_final(2);
        let mut buffer = build(4, &per_config)?;
        buffer.push(tr(0.0))?;
        assert!((buffer.beta() - 0.4).abs() < 1e-6);
        buffer.update_priority(&[0], &[1.0])?;
        buffer.update_priority(&[0], &[1.0])?;
        assert!((buffer.beta() - 1.0).abs() < 1e-6);
        Ok(())
    }
}
