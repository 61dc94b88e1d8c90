//! Scheduling the exponent of importance weights.
use crate::replay_buffer::PerConfig;

/// Linear schedule of $\beta$, the exponent of importance weights.
///
/// $\beta$ moves from `beta_0` to `beta_final` over `n_opts_final` priority
/// updates and stays at `beta_final` afterwards.
#[derive(Clone, Debug)]
pub struct IwScheduler {
    beta_0: f32,
    beta_final: f32,
    n_opts_final: usize,
    n_opts: usize,
}

impl IwScheduler {
    /// Creates a scheduler from the PER configuration.
    pub fn new(config: &PerConfig) -> Self {
        Self {
            beta_0: config.beta_0,
            beta_final: config.beta_final,
            n_opts_final: config.n_opts_final,
            n_opts: 0,
        }
    }

    /// Current value of $\beta$.
    pub fn beta(&self) -> f32 {
        if self.n_opts >= self.n_opts_final {
            self.beta_final
        } else {
            let frac = self.n_opts as f32 / self.n_opts_final as f32;
            self.beta_0 + (self.beta_final - self.beta_0) * frac
        }
    }

    /// Advances the schedule by one priority update.
    pub fn step(&mut self) {
        self.n_opts += 1;
    }
}
