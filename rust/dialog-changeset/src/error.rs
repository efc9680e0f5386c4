use thiserror::Error;

use crate::ChangeReason;

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogChangesetError {
    /// A batch, or a part of it, was not acceptable input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A change lacked an index that its reason requires for positional
    /// application
    #[error("Change #{position} ({reason}) is missing its {field}")]
    MissingIndex {
        /// Position of the offending change within its batch
        position: usize,
        /// Reason of the offending change
        reason: ChangeReason,
        /// Name of the missing index
        field: &'static str,
    },

    /// A change referred to a position that does not exist in the state left
    /// behind by the preceding changes
    #[error("Change #{position} refers to index {index}, but the length is {len}")]
    IndexOutOfBounds {
        /// Position of the offending change within its batch
        position: usize,
        /// The index that was out of range
        index: usize,
        /// Length of the ordered structure at that point of the batch
        len: usize,
    },
}
