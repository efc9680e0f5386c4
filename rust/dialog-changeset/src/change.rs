use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Entry, KeyType, ValueType};

/// The reason a single [`Change`] was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    /// A new key entered the collection.
    Add,
    /// The value under an existing key was replaced. In an ordered
    /// projection the entry may also have changed position.
    Update,
    /// A key left the collection.
    Remove,
    /// The value was mutated in place; neither membership nor position changed.
    Refresh,
    /// The entry changed position. `current` is the value at its new position.
    Moved,
}

impl ChangeReason {
    /// Whether a change of this reason alters membership or position.
    pub fn is_structural(&self) -> bool {
        match self {
            ChangeReason::Add
            | ChangeReason::Update
            | ChangeReason::Remove
            | ChangeReason::Moved => true,
            ChangeReason::Refresh => false,
        }
    }
}

impl Display for ChangeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChangeReason::Add => "add",
            ChangeReason::Update => "update",
            ChangeReason::Remove => "remove",
            ChangeReason::Refresh => "refresh",
            ChangeReason::Moved => "moved",
        };
        f.write_str(name)
    }
}

/// A single entry of a [`ChangeSet`](crate::ChangeSet).
///
/// `previous` is only populated for [`ChangeReason::Update`] (and optionally
/// [`ChangeReason::Moved`]). Indices are populated whenever the change
/// participates in an ordered projection; they are interpreted relative to
/// the state left behind by every preceding change of the same batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    /// Why this change was produced.
    pub reason: ChangeReason,
    /// The key of the affected entry.
    pub key: Key,
    /// The value after the change (for removals, the value that was removed).
    pub current: Value,
    /// The value before the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Value>,
    /// Position of the entry in the ordered projection after the change
    /// (for removals, the position it was removed from).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index: Option<usize>,
    /// Position of the entry in the ordered projection before the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_index: Option<usize>,
}

impl<Key, Value> Change<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    /// Create an unindexed [`Change`], suitable for keyed-only consumers.
    pub fn new(reason: ChangeReason, key: Key, current: Value) -> Self {
        Change {
            reason,
            key,
            current,
            previous: None,
            current_index: None,
            previous_index: None,
        }
    }

    /// Insert `current` under `key` at `index`.
    pub fn add(key: Key, current: Value, index: usize) -> Self {
        Self::new(ChangeReason::Add, key, current).at(index)
    }

    /// Replace `previous` (found at `previous_index`) with `current`, placed
    /// at `index`.
    pub fn update(
        key: Key,
        current: Value,
        previous: Value,
        previous_index: usize,
        index: usize,
    ) -> Self {
        Self::new(ChangeReason::Update, key, current)
            .with_previous(previous)
            .from_index(previous_index)
            .at(index)
    }

    /// Remove `current` (under `key`) from `index`.
    pub fn remove(key: Key, current: Value, index: usize) -> Self {
        Self::new(ChangeReason::Remove, key, current).at(index)
    }

    /// Signal that `current` was mutated in place at `index`.
    pub fn refresh(key: Key, current: Value, index: usize) -> Self {
        Self::new(ChangeReason::Refresh, key, current).at(index)
    }

    /// Move `current` from `previous_index` to `index`.
    pub fn moved(key: Key, current: Value, previous_index: usize, index: usize) -> Self {
        Self::new(ChangeReason::Moved, key, current)
            .from_index(previous_index)
            .at(index)
    }

    /// Set the position of this change after it is applied.
    pub fn at(mut self, index: usize) -> Self {
        self.current_index = Some(index);
        self
    }

    /// Set the position of this change before it is applied.
    pub fn from_index(mut self, previous_index: usize) -> Self {
        self.previous_index = Some(previous_index);
        self
    }

    /// Set the value this change replaces.
    pub fn with_previous(mut self, previous: Value) -> Self {
        self.previous = Some(previous);
        self
    }

    /// The key and current value of this change as an [`Entry`].
    pub fn entry(&self) -> Entry<Key, Value> {
        Entry::new(self.key.clone(), self.current.clone())
    }
}
