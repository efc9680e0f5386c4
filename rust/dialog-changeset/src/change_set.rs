use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Change, ChangeReason, DialogChangesetError, Entry, KeyType, ValueType};

/// The batch-level reason of a [`ChangeSet`], describing why the target
/// order was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortReason {
    /// The first batch delivered for a collection.
    InitialLoad,
    /// The ordering itself changed; every position may be different.
    ComparerChanged,
    /// The producer requested that consumers start over.
    Reset,
    /// Values were added, updated, removed or refreshed.
    DataChanged,
    /// Entries were repositioned without any change of membership.
    Reorder,
}

impl SortReason {
    /// All reasons, in their wire order.
    pub const ALL: [SortReason; 5] = [
        SortReason::InitialLoad,
        SortReason::ComparerChanged,
        SortReason::Reset,
        SortReason::DataChanged,
        SortReason::Reorder,
    ];

    /// The canonical name of this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortReason::InitialLoad => "initial_load",
            SortReason::ComparerChanged => "comparer_changed",
            SortReason::Reset => "reset",
            SortReason::DataChanged => "data_changed",
            SortReason::Reorder => "reorder",
        }
    }
}

impl Display for SortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for SortReason {
    type Error = DialogChangesetError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SortReason::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| {
                DialogChangesetError::InvalidArgument(format!("Unrecognized sort reason {value}"))
            })
    }
}

impl From<SortReason> for u8 {
    fn from(value: SortReason) -> Self {
        match value {
            SortReason::InitialLoad => 0,
            SortReason::ComparerChanged => 1,
            SortReason::Reset => 2,
            SortReason::DataChanged => 3,
            SortReason::Reorder => 4,
        }
    }
}

impl FromStr for SortReason {
    type Err = DialogChangesetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SortReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == value)
            .ok_or_else(|| {
                DialogChangesetError::InvalidArgument(format!(
                    "Unrecognized sort reason '{value}'"
                ))
            })
    }
}

/// An ordered batch of [`Change`]s describing how a collection moved from one
/// state to the next.
///
/// Alongside the changes, a [`ChangeSet`] may carry the complete target order
/// (`sorted`). Consumers that rebuild rather than patch repopulate from it.
/// Keyed-only consumers ignore both the target order and the batch reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    reason: SortReason,
    changes: Vec<Change<Key, Value>>,
    #[serde(default)]
    sorted: Vec<Entry<Key, Value>>,
}

impl<Key, Value> ChangeSet<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    /// Create an empty [`ChangeSet`] with the given batch reason.
    pub fn new(reason: SortReason) -> Self {
        ChangeSet {
            reason,
            changes: Vec::new(),
            sorted: Vec::new(),
        }
    }

    /// Assemble a [`ChangeSet`] from its parts.
    pub fn from_parts(
        reason: SortReason,
        changes: Vec<Change<Key, Value>>,
        sorted: Vec<Entry<Key, Value>>,
    ) -> Self {
        ChangeSet {
            reason,
            changes,
            sorted,
        }
    }

    /// Append a change to the end of this batch.
    pub fn push(&mut self, change: Change<Key, Value>) {
        self.changes.push(change);
    }

    /// Builder form of [`ChangeSet::push`].
    pub fn with(mut self, change: Change<Key, Value>) -> Self {
        self.push(change);
        self
    }

    /// Replace the target order carried by this batch.
    pub fn with_sorted<Sorted>(mut self, sorted: Sorted) -> Self
    where
        Sorted: IntoIterator<Item = Entry<Key, Value>>,
    {
        self.sorted = sorted.into_iter().collect();
        self
    }

    /// The batch-level reason.
    pub fn reason(&self) -> SortReason {
        self.reason
    }

    /// The changes of this batch, in the order they must be applied.
    pub fn changes(&self) -> &[Change<Key, Value>] {
        &self.changes
    }

    /// The target order this batch describes.
    pub fn sorted(&self) -> &[Entry<Key, Value>] {
        &self.sorted
    }

    /// Iterate over the changes in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Change<Key, Value>> {
        self.changes.iter()
    }

    /// Total number of changes.
    pub fn count(&self) -> usize {
        self.changes.len()
    }

    /// Whether this batch has no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of [`ChangeReason::Add`] changes.
    pub fn adds(&self) -> usize {
        self.count_of(ChangeReason::Add)
    }

    /// Number of [`ChangeReason::Update`] changes.
    pub fn updates(&self) -> usize {
        self.count_of(ChangeReason::Update)
    }

    /// Number of [`ChangeReason::Remove`] changes.
    pub fn removes(&self) -> usize {
        self.count_of(ChangeReason::Remove)
    }

    /// Number of [`ChangeReason::Refresh`] changes.
    pub fn refreshes(&self) -> usize {
        self.count_of(ChangeReason::Refresh)
    }

    /// Number of [`ChangeReason::Moved`] changes.
    pub fn moves(&self) -> usize {
        self.count_of(ChangeReason::Moved)
    }

    /// Number of changes that alter membership or position.
    pub fn structural(&self) -> usize {
        self.count() - self.refreshes()
    }

    fn count_of(&self, reason: ChangeReason) -> usize {
        self.changes
            .iter()
            .filter(|change| change.reason == reason)
            .count()
    }
}

impl<Key, Value> FromIterator<Change<Key, Value>> for ChangeSet<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    /// Collect an unordered batch. The reason defaults to
    /// [`SortReason::DataChanged`] and no target order is attached.
    fn from_iter<I: IntoIterator<Item = Change<Key, Value>>>(iter: I) -> Self {
        ChangeSet::from_parts(SortReason::DataChanged, iter.into_iter().collect(), Vec::new())
    }
}

impl<'a, Key, Value> IntoIterator for &'a ChangeSet<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    type Item = &'a Change<Key, Value>;
    type IntoIter = std::slice::Iter<'a, Change<Key, Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
