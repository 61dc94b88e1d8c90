//! Observation and action spaces.
//!
//! Only the information needed for sizing replay buffers is kept here: the
//! bounds of continuous spaces and the arity of discrete ones.
use crate::error::ReplayError;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, convert::TryFrom, fmt};

/// Bounded continuous space.
///
/// `low` and `high` are stored in row-major order and have
/// `shape.iter().product()` elements each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoxSpace")]
pub struct BoxSpace {
    shape: Vec<usize>,
    low: Vec<f32>,
    high: Vec<f32>,
}

#[derive(Deserialize)]
struct RawBoxSpace {
    shape: Vec<usize>,
    low: Vec<f32>,
    high: Vec<f32>,
}

impl TryFrom<RawBoxSpace> for BoxSpace {
    type Error = ReplayError;

    fn try_from(raw: RawBoxSpace) -> Result<Self, Self::Error> {
        BoxSpace::new(raw.shape, raw.low, raw.high)
    }
}

impl BoxSpace {
    /// Creates a box space with element-wise bounds.
    pub fn new(shape: Vec<usize>, low: Vec<f32>, high: Vec<f32>) -> Result<Self, ReplayError> {
        let n = shape.iter().product::<usize>();
        if low.len() != n || high.len() != n {
            return Err(ReplayError::InvalidSpace(format!(
                "shape {:?} needs {} bounds, got low={} high={}",
                shape,
                n,
                low.len(),
                high.len()
            )));
        }
        if let Some(i) = (0..n).find(|&i| !(low[i] <= high[i])) {
            return Err(ReplayError::InvalidSpace(format!(
                "low[{}]={} is not below high[{}]={}",
                i, low[i], i, high[i]
            )));
        }
        Ok(Self { shape, low, high })
    }

    /// Creates a box space with the same bounds for all elements.
    pub fn uniform(shape: Vec<usize>, low: f32, high: f32) -> Result<Self, ReplayError> {
        let n = shape.iter().product::<usize>();
        Self::new(shape, vec![low; n], vec![high; n])
    }

    /// Shape of the space.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Lower bounds, flattened.
    pub fn low(&self) -> &[f32] {
        &self.low
    }

    /// Upper bounds, flattened.
    pub fn high(&self) -> &[f32] {
        &self.high
    }

    /// Number of elements, i.e., the product of the dimensions.
    pub fn size(&self) -> usize {
        self.low.len()
    }
}

/// Observation or action space of an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// Bounded continuous space.
    Box(BoxSpace),

    /// Discrete space with `n` choices.
    Discrete(usize),

    /// Product of discrete spaces.
    MultiDiscrete(Vec<usize>),

    /// Binary vector of the given length.
    MultiBinary(usize),

    /// Tuple of spaces.
    Tuple(Vec<Space>),

    /// Named collection of spaces.
    Dict(BTreeMap<String, Space>),
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Box(b) => write!(f, "Box{:?}", b.shape()),
            Self::Discrete(n) => write!(f, "Discrete({})", n),
            Self::MultiDiscrete(ns) => write!(f, "MultiDiscrete({:?})", ns),
            Self::MultiBinary(n) => write!(f, "MultiBinary({})", n),
            Self::Tuple(spaces) => write!(f, "Tuple(len={})", spaces.len()),
            Self::Dict(spaces) => write!(f, "Dict(keys={:?})", spaces.keys().collect::<Vec<_>>()),
        }
    }
}

/// Returns the number of elements used to store a sample of the space.
///
/// A discrete action is stored as its index, so the size of a discrete space
/// is 1 whatever the number of choices.
pub fn space_size(space: &Space) -> Result<usize, ReplayError> {
    match space {
        Space::Box(b) => Ok(b.size()),
        Space::Discrete(_) => Ok(1),
        _ => Err(ReplayError::UnsupportedSpace(space.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_size() -> Result<(), ReplayError> {
        let space = Space::Box(BoxSpace::uniform(vec![3], -1.0, 1.0)?);
        assert_eq!(space_size(&space)?, 3);

        let space = Space::Box(BoxSpace::uniform(vec![2, 3], 0.0, 255.0)?);
        assert_eq!(space_size(&space)?, 6);
        Ok(())
    }

    #[test]
    fn test_discrete_size_ignores_arity() -> Result<(), ReplayError> {
        assert_eq!(space_size(&Space::Discrete(2))?, 1);
        assert_eq!(space_size(&Space::Discrete(18))?, 1);
        Ok(())
    }

    #[test]
    fn test_unsupported_spaces() {
        let spaces = vec![
            Space::MultiDiscrete(vec![2, 3]),
            Space::MultiBinary(4),
            Space::Tuple(vec![Space::Discrete(2)]),
            Space::Dict(
                vec![("pos".to_string(), Space::Discrete(3))]
                    .into_iter()
                    .collect(),
            ),
        ];
        for space in spaces.iter() {
            match space_size(space) {
                Err(ReplayError::UnsupportedSpace(_)) => {}
                r => panic!("unexpected result for {}: {:?}", space, r),
            }
        }
    }

    #[test]
    fn test_invalid_box() {
        assert!(BoxSpace::new(vec![2], vec![0.0], vec![1.0, 1.0]).is_err());
        assert!(BoxSpace::new(vec![1], vec![1.0], vec![0.0]).is_err());
        assert!(BoxSpace::new(vec![1], vec![f32::NAN], vec![0.0]).is_err());
    }

    #[test]
    fn test_box_from_yaml() -> anyhow::Result<()> {
        let yaml = "Box:\n  shape: [3]\n  low: [-1.0, -1.0, -1.0]\n  high: [1.0, 1.0, 1.0]\n";
        let space: Space = serde_yaml::from_str(yaml)?;
        assert_eq!(space_size(&space)?, 3);

        let yaml = "Box:\n  shape: [3]\n  low: [-1.0]\n  high: [1.0]\n";
        assert!(serde_yaml::from_str::<Space>(yaml).is_err());
        Ok(())
    }
}
