//! Sum tree for proportional prioritized sampling.
use rand::{rngs::StdRng, Rng};
use segment_tree::{ops::MinIgnoreNaN, SegmentPoint};
use serde::{Deserialize, Serialize};

/// Normalization of importance weights.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum WeightNormalizer {
    /// Normalized by the maximum weight over all stored transitions.
    All,

    /// Normalized by the maximum weight in the sampled batch.
    Batch,
}

/// Binary tree whose leaves hold `(p + eps)^alpha` and whose inner nodes hold
/// the sums of their children.
///
/// Leaf `i` of a tree with capacity `c` is at `tree[i + c - 1]`.
#[derive(Debug)]
pub(crate) struct SumTree {
    eps: f32,
    alpha: f32,
    capacity: usize,
    n_samples: usize,
    tree: Vec<f32>,
    min_tree: SegmentPoint<f32, MinIgnoreNaN>,
    max_priority: f32,
    normalize: WeightNormalizer,
}

impl SumTree {
    pub fn new(capacity: usize, alpha: f32, eps: f32, normalize: WeightNormalizer) -> Self {
        Self {
            eps,
            alpha,
            capacity,
            n_samples: 0,
            tree: vec![0f32; 2 * capacity - 1],
            min_tree: SegmentPoint::build(vec![f32::MAX; capacity], MinIgnoreNaN),
            max_priority: 1.0,
            normalize,
        }
    }

    fn propagate(&mut self, mut ix: usize, change: f32) {
        while ix != 0 {
            ix = (ix - 1) / 2;
            self.tree[ix] += change;
        }
    }

    fn retrieve(&self, mut ix: usize, mut s: f32) -> usize {
        loop {
            let left = 2 * ix + 1;
            let right = left + 1;

            if left >= self.tree.len() {
                return ix;
            }

            if s <= self.tree[left] || self.tree[right] == 0f32 {
                ix = left;
            } else {
                s -= self.tree[left];
                ix = right;
            }
        }
    }

    /// Sum of all priorities.
    pub fn total(&self) -> f32 {
        self.tree[0]
    }

    /// Largest raw priority seen so far, assigned to new transitions.
    pub fn max_priority(&self) -> f32 {
        self.max_priority
    }

    /// Sets the priority of a newly stored transition at `ix`.
    pub fn add(&mut self, ix: usize, p: f32) {
        debug_assert!(ix <= self.n_samples || self.n_samples == self.capacity);

        self.update(ix, p);

        if self.n_samples < self.capacity {
            self.n_samples += 1;
        }
    }

    /// Updates the raw priority `p` of the transition at `ix`.
    pub fn update(&mut self, ix: usize, p: f32) {
        debug_assert!(ix < self.capacity);

        let p = p.abs();
        if p > self.max_priority {
            self.max_priority = p;
        }
        let p = (p + self.eps).powf(self.alpha);
        self.min_tree.modify(ix, p);
        let ix = ix + self.capacity - 1;
        let change = p - self.tree[ix];
        self.tree[ix] = p;
        self.propagate(ix, change);
    }

    /// Returns the index of the leaf at which the cumulative sum of priorities reaches `s`.
    pub fn get(&self, s: f32) -> usize {
        let ix = self.retrieve(0, s);
        debug_assert!(ix >= (self.capacity - 1));
        (ix + 1 - self.capacity).min(self.n_samples.saturating_sub(1))
    }

    /// Priority stored at leaf `ix`.
    pub fn leaf(&self, ix: usize) -> f32 {
        self.tree[ix + self.capacity - 1]
    }

    /// Samples indices and returns them with importance weights.
    ///
    /// The weight is $w_i=\left(N P(i)\right)^{-\beta}$, normalized by its maximum
    /// over either the stored transitions or the batch.
    pub fn sample(&self, batch_size: usize, beta: f32, rng: &mut StdRng) -> (Vec<usize>, Vec<f32>) {
        let p_sum = self.total();
        let ixs = (0..batch_size)
            .map(|_| self.get(p_sum * rng.gen::<f32>()))
            .collect::<Vec<_>>();

        let n = self.n_samples as f32 / p_sum;
        let ws = ixs
            .iter()
            .map(|&ix| (n * self.leaf(ix)).powf(-beta))
            .collect::<Vec<_>>();

        let w_max = match self.normalize {
            WeightNormalizer::All => {
                let p_min = self.min_tree.query(0, self.n_samples);
                (n * p_min).powf(-beta)
            }
            WeightNormalizer::Batch => ws.iter().fold(f32::MIN, |m, &w| w.max(m)),
        };

        if !w_max.is_finite() || w_max <= 0.0 {
            log::warn!(
                "Invalid weight normalizer {} (p_sum={}, n_samples={})",
                w_max,
                p_sum,
                self.n_samples
            );
        }

        let ws = ws.iter().map(|w| w / w_max).collect();
        (ixs, ws)
    }
}
