use serde::{Deserialize, Serialize};

use crate::{ChangeSet, KeyType, SortReason, ValueType};

/// Default number of structural changes a [`SortReason::DataChanged`] batch
/// may carry before it is applied as a rebuild.
pub const DEFAULT_REFRESH_THRESHOLD: usize = 25;

/// How a batch should be applied to an ordered structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Clear the structure and repopulate it from the target order.
    Rebuild,
    /// Replay the positional changes of the batch in sequence.
    Patch,
}

/// Chooses between [`Strategy::Rebuild`] and [`Strategy::Patch`] for a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildPolicy {
    /// Maximum number of structural changes a data-changed batch may carry
    /// and still be patched.
    pub refresh_threshold: usize,
}

impl Default for RebuildPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_THRESHOLD)
    }
}

impl RebuildPolicy {
    /// Create a policy with the given threshold.
    pub const fn new(refresh_threshold: usize) -> Self {
        Self { refresh_threshold }
    }

    /// Decide how `changes` should be applied.
    pub fn decide<Key, Value>(&self, changes: &ChangeSet<Key, Value>) -> Strategy
    where
        Key: KeyType,
        Value: ValueType,
    {
        match changes.reason() {
            SortReason::InitialLoad | SortReason::ComparerChanged | SortReason::Reset => {
                Strategy::Rebuild
            }
            SortReason::DataChanged => {
                if changes.structural() > self.refresh_threshold {
                    Strategy::Rebuild
                } else {
                    Strategy::Patch
                }
            }
            // Membership is unchanged, so a rebuild would only add work
            SortReason::Reorder => Strategy::Patch,
        }
    }
}
