//! Ring storage of transitions.
use super::{Transition, TransitionBatch};
use crate::error::ReplayError;
use ndarray::{Array2, Axis};

/// Fixed-size ring of transitions.
///
/// When full, a new transition overwrites the oldest one.
pub(crate) struct RingStorage {
    capacity: usize,
    obs_dim: usize,
    act_dim: usize,

    /// Next insertion index.
    i: usize,

    /// Number of stored transitions.
    size: usize,

    obs: Array2<f32>,
    act: Array2<f32>,
    next_obs: Array2<f32>,
    reward: Vec<f32>,
    is_done: Vec<i8>,

    /// Discount of the bootstrapped value, kept by n-step buffers only.
    discount: Option<Vec<f32>>,
}

impl RingStorage {
    pub fn new(capacity: usize, obs_dim: usize, act_dim: usize, store_discount: bool) -> Self {
        Self {
            capacity,
            obs_dim,
            act_dim,
            i: 0,
            size: 0,
            obs: Array2::zeros((capacity, obs_dim)),
            act: Array2::zeros((capacity, act_dim)),
            next_obs: Array2::zeros((capacity, obs_dim)),
            reward: vec![0.; capacity],
            is_done: vec![0; capacity],
            discount: match store_discount {
                true => Some(vec![1.; capacity]),
                false => None,
            },
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    pub fn act_dim(&self) -> usize {
        self.act_dim
    }

    pub fn len(&self) -> usize {
        self.size
    }

    /// Checks the dimensions of a transition without storing it.
    pub fn check(&self, tr: &Transition) -> Result<(), ReplayError> {
        check_transition(tr, self.obs_dim, self.act_dim)
    }

    /// Stores a transition and returns the index where it was written.
    pub fn push(&mut self, tr: Transition) -> Result<usize, ReplayError> {
        self.push_discounted(tr, 1.0)
    }

    /// Stores a transition with the discount of its bootstrapped value.
    ///
    /// The discount is dropped if the storage does not keep discounts.
    pub fn push_discounted(&mut self, tr: Transition, discount: f32) -> Result<usize, ReplayError> {
        self.check(&tr)?;
        let ix = self.i;
        write_row(&mut self.obs, ix, &tr.obs);
        write_row(&mut self.act, ix, &tr.act);
        write_row(&mut self.next_obs, ix, &tr.next_obs);
        self.reward[ix] = tr.reward;
        self.is_done[ix] = tr.is_done as i8;
        if let Some(d) = self.discount.as_mut() {
            d[ix] = discount;
        }

        self.i = (self.i + 1) % self.capacity;
        if self.size < self.capacity {
            self.size += 1;
        }
        Ok(ix)
    }

    /// Gathers the transitions at the given indices.
    ///
    /// Importance weights are left to the caller.
    pub fn sample(&self, ixs: Vec<usize>) -> TransitionBatch {
        TransitionBatch {
            obs: self.obs.select(Axis(0), &ixs),
            act: self.act.select(Axis(0), &ixs),
            next_obs: self.next_obs.select(Axis(0), &ixs),
            reward: ixs.iter().map(|&ix| self.reward[ix]).collect(),
            is_done: ixs.iter().map(|&ix| self.is_done[ix]).collect(),
            weight: None,
            discount: self
                .discount
                .as_ref()
                .map(|d| ixs.iter().map(|&ix| d[ix]).collect()),
            ix_sample: ixs,
        }
    }

    pub fn clear(&mut self) {
        self.i = 0;
        self.size = 0;
    }
}

#[inline]
fn write_row(dst: &mut Array2<f32>, ix: usize, src: &[f32]) {
    dst.row_mut(ix)
        .iter_mut()
        .zip(src.iter())
        .for_each(|(d, s)| *d = *s);
}

/// Checks the dimensions of a transition.
pub(crate) fn check_transition(
    tr: &Transition,
    obs_dim: usize,
    act_dim: usize,
) -> Result<(), ReplayError> {
    check_dim("obs", obs_dim, tr.obs.len())?;
    check_dim("act", act_dim, tr.act.len())?;
    check_dim("next_obs", obs_dim, tr.next_obs.len())?;
    Ok(())
}

fn check_dim(field: &'static str, expected: usize, actual: usize) -> Result<(), ReplayError> {
    if expected != actual {
        Err(ReplayError::DimMismatch {
            field,
            expected,
            actual,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(v: f32) -> Transition {
        Transition::new(vec![v; 2], vec![v], vec![v + 1.0; 2], v, false)
    }

    #[test]
    fn test_overwrite_oldest() -> Result<(), ReplayError> {
        let mut storage = RingStorage::new(3, 2, 1, false);
        for i in 0..5 {
            storage.push(tr(i as f32))?;
        }
        assert_eq!(storage.len(), 3);

        // Slots 0 and 1 were overwritten by the 4th and 5th transitions.
        let batch = storage.sample(vec![0, 1, 2]);
        assert_eq!(batch.reward, vec![3.0, 4.0, 2.0]);
        assert_eq!(batch.obs.row(0).to_vec(), vec![3.0, 3.0]);
        assert_eq!(batch.next_obs.row(1).to_vec(), vec![5.0, 5.0]);
        assert!(batch.discount.is_none());
        Ok(())
    }

    #[test]
    fn test_discount_column() -> Result<(), ReplayError> {
        let mut storage = RingStorage::new(4, 2, 1, true);
        storage.push_discounted(tr(0.0), 0.81)?;
        storage.push(tr(1.0))?;
        let batch = storage.sample(vec![1, 0]);
        assert_eq!(batch.discount, Some(vec![1.0, 0.81]));
        Ok(())
    }

    #[test]
    fn test_dim_mismatch() {
        let mut storage = RingStorage::new(3, 2, 1, false);
        let bad = Transition::new(vec![0.0; 3], vec![0.0], vec![0.0; 2], 0.0, false);
        assert_eq!(
            storage.push(bad),
            Err(ReplayError::DimMismatch {
                field: "obs",
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(storage.len(), 0);
    }
}
