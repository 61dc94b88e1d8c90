//! Properties of policies used for sizing replay buffers.
use serde::{Deserialize, Serialize};

/// A policy being trained.
pub trait PolicyBase {
    /// Number of environment steps between updates.
    ///
    /// On-policy agents collect exactly this many transitions per update.
    fn update_interval(&self) -> usize;

    /// Returns the off-policy properties if the policy reuses past experience.
    fn as_off_policy(&self) -> Option<&dyn OffPolicyAgent> {
        None
    }
}

/// Properties of policies learning from replayed experience.
pub trait OffPolicyAgent {
    /// Number of transitions kept for replay.
    fn memory_capacity(&self) -> usize;

    /// Discount factor of returns.
    fn discount(&self) -> f32;
}

/// Off-policy properties of [`PolicyConfig`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OffPolicyConfig {
    /// Number of transitions kept for replay.
    pub memory_capacity: usize,

    /// Discount factor.
    pub discount: f32,
}

impl Default for OffPolicyConfig {
    fn default() -> Self {
        Self {
            memory_capacity: 1_000_000,
            discount: 0.99,
        }
    }
}

impl OffPolicyAgent for OffPolicyConfig {
    fn memory_capacity(&self) -> usize {
        self.memory_capacity
    }

    fn discount(&self) -> f32 {
        self.discount
    }
}

/// Description of a policy, loadable from a YAML file.
///
/// ```yaml
/// update_interval: 1
/// off_policy:
///   memory_capacity: 100000
///   discount: 0.99
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PolicyConfig {
    /// Number of environment steps between updates.
    pub update_interval: usize,

    /// Off-policy properties. `None` means an on-policy agent.
    #[serde(default)]
    pub off_policy: Option<OffPolicyConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            update_interval: 1,
            off_policy: Some(OffPolicyConfig::default()),
        }
    }
}

impl PolicyConfig {
    /// An on-policy agent updated every `update_interval` steps.
    pub fn on_policy(update_interval: usize) -> Self {
        Self {
            update_interval,
            off_policy: None,
        }
    }

    /// An off-policy agent.
    pub fn off_policy(update_interval: usize, memory_capacity: usize, discount: f32) -> Self {
        Self {
            update_interval,
            off_policy: Some(OffPolicyConfig {
                memory_capacity,
                discount,
            }),
        }
    }
}

impl PolicyBase for PolicyConfig {
    fn update_interval(&self) -> usize {
        self.update_interval
    }

    fn as_off_policy(&self) -> Option<&dyn OffPolicyAgent> {
        self.off_policy.as_ref().map(|c| c as &dyn OffPolicyAgent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_policy_from_yaml() -> anyhow::Result<()> {
        let config: PolicyConfig = serde_yaml::from_str("update_interval: 2048\n")?;
        assert_eq!(config, PolicyConfig::on_policy(2048));
        assert!(config.as_off_policy().is_none());
        Ok(())
    }

    #[test]
    fn test_off_policy() {
        let config = PolicyConfig::off_policy(1, 5000, 0.95);
        let off = config.as_off_policy().expect("off-policy agent");
        assert_eq!(off.memory_capacity(), 5000);
        assert_eq!(off.discount(), 0.95);
    }
}
