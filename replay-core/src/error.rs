//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum ReplayError {
    /// The space is neither a box nor a discrete space.
    #[error("Unsupported space type: {0} (assuming to use Box or Discrete)")]
    UnsupportedSpace(String),

    /// Malformed space descriptor.
    #[error("Invalid space: {0}")]
    InvalidSpace(String),

    /// Malformed buffer configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A transition does not match the dimensions of the buffer.
    #[error("Dimension mismatch in {field}: expected {expected}, got {actual}")]
    DimMismatch {
        /// Name of the field of the transition.
        field: &'static str,
        /// Dimension of the buffer.
        expected: usize,
        /// Dimension of the given data.
        actual: usize,
    },

    /// Sampling from a buffer without transitions.
    #[error("Replay buffer is empty")]
    EmptyBuffer,

    /// Indices and TD errors given to priority update have different lengths.
    #[error("Priority update with {ixs} indices and {td_errs} TD errors")]
    PriorityLengthMismatch {
        /// Number of indices.
        ixs: usize,
        /// Number of TD errors.
        td_errs: usize,
    },

    /// Index beyond the stored transitions.
    #[error("Index {ix} out of range for buffer of length {len}")]
    IndexOutOfRange {
        /// The index.
        ix: usize,
        /// Number of stored transitions.
        len: usize,
    },
}
