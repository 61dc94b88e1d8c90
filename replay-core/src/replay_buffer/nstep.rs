//! N-step return accumulation.
use super::{
    storage::check_transition, NstepConfig, NstepTarget, PerConfig, PlainReplayBuffer,
    PrioritizedReplayBuffer, ReplayBuffer, ReplayBufferConfig, Transition, TransitionBatch,
};
use anyhow::Result;
use std::collections::VecDeque;

/// Replay buffer storing n-step transitions with uniform sampling.
pub type NstepReplayBuffer = NstepBuffer<PlainReplayBuffer>;

/// Replay buffer storing n-step transitions with prioritized sampling.
pub type NstepPrioritizedReplayBuffer = NstepBuffer<PrioritizedReplayBuffer>;

/// Accumulates single-step transitions into n-step transitions before
/// storing them in the inner buffer `B`.
///
/// A stored transition `(o_t, a_t, o_t+k, R, is_done)` has
/// `R = r_t + γ r_t+1 + ... + γ^(k-1) r_t+k-1` with `k = n_step`, or fewer
/// steps when the episode ends. The discount `γ^k` of the bootstrapped value
/// is stored alongside and returned in [`TransitionBatch::discount`].
///
/// Transitions stay pending until `n_step` of them are available; an episode
/// end, signaled by `is_done` or [`ReplayBuffer::on_episode_end`], flushes
/// all of them.
pub struct NstepBuffer<B> {
    inner: B,
    nstep_config: NstepConfig,
    pending: VecDeque<Transition>,
}

impl NstepBuffer<PlainReplayBuffer> {
    /// Builds an n-step buffer with uniform sampling.
    pub fn build(config: &ReplayBufferConfig, nstep_config: &NstepConfig) -> Result<Self> {
        let inner = PlainReplayBuffer::build_with_discount(config, true)?;
        Self::new(inner, nstep_config)
    }
}

impl NstepBuffer<PrioritizedReplayBuffer> {
    /// Builds an n-step buffer with prioritized sampling.
    pub fn build(
        config: &ReplayBufferConfig,
        per_config: &PerConfig,
        nstep_config: &NstepConfig,
    ) -> Result<Self> {
        let inner = PrioritizedReplayBuffer::build_with_discount(config, per_config, true)?;
        Self::new(inner, nstep_config)
    }
}

impl<B: NstepTarget> NstepBuffer<B> {
    fn new(inner: B, nstep_config: &NstepConfig) -> Result<Self> {
        nstep_config.validate()?;
        log::debug!(
            "N-step accumulation: n_step={}, discount={}",
            nstep_config.n_step,
            nstep_config.discount
        );
        Ok(Self {
            inner,
            pending: VecDeque::with_capacity(nstep_config.n_step),
            nstep_config: nstep_config.clone(),
        })
    }

    /// Returns the n-step configuration.
    pub fn nstep_config(&self) -> &NstepConfig {
        &self.nstep_config
    }

    /// Returns the buffer storing accumulated transitions.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of transitions waiting for following steps.
    pub fn n_pending(&self) -> usize {
        self.pending.len()
    }

    /// Stores the oldest pending transition, accumulating the rewards of all
    /// pending ones.
    fn emit_front(&mut self) -> Result<()> {
        let gamma = self.nstep_config.discount;
        let (reward, discount) = self
            .pending
            .iter()
            .fold((0f32, 1f32), |(r, d), tr| (r + d * tr.reward, d * gamma));
        let (next_obs, is_done) = match self.pending.back() {
            Some(last) => (last.next_obs.clone(), last.is_done),
            None => return Ok(()),
        };
        if let Some(first) = self.pending.pop_front() {
            let tr = Transition {
                next_obs,
                reward,
                is_done,
                ..first
            };
            self.inner.push_discounted(tr, discount)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            log::debug!("Flush {} pending transitions", self.pending.len());
        }
        while !self.pending.is_empty() {
            self.emit_front()?;
        }
        Ok(())
    }
}

impl<B: NstepTarget> ReplayBuffer for NstepBuffer<B> {
    fn push(&mut self, tr: Transition) -> Result<()> {
        check_transition(&tr, self.inner.obs_dim(), self.inner.act_dim())?;
        let is_done = tr.is_done;
        self.pending.push_back(tr);

        if is_done {
            self.flush()
        } else if self.pending.len() >= self.nstep_config.n_step {
            self.emit_front()
        } else {
            Ok(())
        }
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn obs_dim(&self) -> usize {
        self.inner.obs_dim()
    }

    fn act_dim(&self) -> usize {
        self.inner.act_dim()
    }

    fn batch(&mut self, size: usize) -> Result<TransitionBatch> {
        self.inner.batch(size)
    }

    fn update_priority(&mut self, ixs: &[usize], td_errs: &[f32]) -> Result<()> {
        self.inner.update_priority(ixs, td_errs)
    }

    fn on_episode_end(&mut self) -> Result<()> {
        self.flush()?;
        self.inner.on_episode_end()
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplayError;

    fn tr(t: usize, is_done: bool) -> Transition {
        let v = t as f32;
        Transition::new(vec![v], vec![v], vec![v + 1.0], 1.0, is_done)
    }

    fn build(n_step: usize, discount: f32) -> Result<NstepReplayBuffer> {
        let config = ReplayBufferConfig::default().capacity(16);
        NstepReplayBuffer::build(&config, &NstepConfig::new(n_step, discount))
    }

    /// Returns `(obs, next_obs, reward, is_done, discount)` of stored transitions,
    /// sorted by `obs`.
    fn contents(buffer: &mut NstepReplayBuffer) -> Result<Vec<(f32, f32, f32, i8, f32)>> {
        let batch = buffer.batch(256)?;
        let discount = batch.discount.as_ref().expect("discounts of n-step buffer");
        let mut rows = (0..batch.len())
            .map(|i| {
                (
                    batch.obs[[i, 0]],
                    batch.next_obs[[i, 0]],
                    batch.reward[i],
                    batch.is_done[i],
                    discount[i],
                )
            })
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        rows.dedup();
        Ok(rows)
    }

    #[test]
    fn test_accumulate_rewards() -> Result<()> {
        let mut buffer = build(3, 0.5)?;
        for t in 0..4 {
            buffer.push(tr(t, false))?;
        }
        // Transitions from t=0 and t=1 have 3 following steps.
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.n_pending(), 2);

        let rows = contents(&mut buffer)?;
        assert_eq!(
            rows,
            vec![(0.0, 3.0, 1.75, 0, 0.125), (1.0, 4.0, 1.75, 0, 0.125)]
        );
        Ok(())
    }

    #[test]
    fn test_flush_at_episode_end() -> Result<()> {
        let mut buffer = build(3, 0.5)?;
        buffer.push(tr(0, false))?;
        buffer.push(tr(1, false))?;
        buffer.push(tr(2, false))?;
        buffer.push(tr(3, true))?;
        assert_eq!(buffer.n_pending(), 0);
        assert_eq!(buffer.len(), 4);

        let rows = contents(&mut buffer)?;
        assert_eq!(
            rows,
            vec![
                (0.0, 3.0, 1.75, 0, 0.125),
                (1.0, 4.0, 1.75, 1, 0.125),
                (2.0, 4.0, 1.5, 1, 0.25),
                (3.0, 4.0, 1.0, 1, 0.5),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_on_episode_end() -> Result<()> {
        let mut buffer = build(4, 0.9)?;
        buffer.push(tr(0, false))?;
        buffer.push(tr(1, false))?;
        assert_eq!(buffer.len(), 0);
        buffer.on_episode_end()?;
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.n_pending(), 0);
        Ok(())
    }

    #[test]
    fn test_one_step() -> Result<()> {
        let mut buffer = build(1, 0.99)?;
        buffer.push(tr(0, false))?;
        assert_eq!(buffer.len(), 1);
        let rows = contents(&mut buffer)?;
        assert_eq!(rows, vec![(0.0, 1.0, 1.0, 0, 0.99)]);
        Ok(())
    }

    #[test]
    fn test_invalid_config_and_dims() -> Result<()> {
        assert!(build(0, 0.99).is_err());

        let mut buffer = build(2, 0.99)?;
        let bad = Transition::new(vec![0.0; 2], vec![0.0], vec![0.0], 0.0, false);
        let err = buffer.push(bad).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReplayError>(),
            Some(ReplayError::DimMismatch { field: "obs", .. })
        ));
        assert_eq!(buffer.n_pending(), 0);
        Ok(())
    }

    #[test]
    fn test_prioritized_inner() -> Result<()> {
        let config = ReplayBufferConfig::default().capacity(8);
        let mut buffer = NstepPrioritizedReplayBuffer::build(
            &config,
            &PerConfig::default(),
            &NstepConfig::new(2, 0.9),
        )?;
        for t in 0..3 {
            buffer.push(tr(t, t == 2))?;
        }
        assert_eq!(buffer.len(), 3);
        let batch = buffer.batch(8)?;
        assert!(batch.weight.is_some());
        assert!(batch.discount.is_some());
        buffer.update_priority(&batch.ix_sample, &vec![0.5; batch.len()])?;
        Ok(())
    }
}
