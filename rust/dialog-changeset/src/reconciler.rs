//! Sorted list reconciliation.
//!
//! A [`SortedListReconciler`] owns an [`OrderedSink`] and brings it into
//! agreement with the target order carried by each incoming [`ChangeSet`].
//! It applies a batch in one of two ways, as chosen by its [`RebuildPolicy`]:
//!
//! - **Rebuild**: the sink is cleared and repopulated from
//!   [`ChangeSet::sorted`] inside a single [`Suspension`] window, so that
//!   observers see one reset instead of one notification per item.
//! - **Patch**: the changes are replayed strictly in batch order. Each
//!   change's indices are relative to the state left behind by the changes
//!   before it:
//!
//! ```text
//! Add      insert current at current_index
//! Remove   remove at current_index
//! Update   remove at previous_index, then insert current at current_index
//! Moved    remove at previous_index, then insert current at current_index
//! Refresh  replace the item at current_index with current, in place
//! ```
//!
//! Either way, after a successful call the i-th item of the sink is the
//! value of the i-th entry of the target order.
//!
//! Before the first mutation of a patch, the whole batch is checked against
//! the sink's length as it evolves through the batch. A batch with a missing
//! or out-of-range index is rejected and the sink is left as it was. A
//! data-changed batch that is rebuilt must carry a target order whose length
//! agrees with its adds and removes.

use crate::{
    ChangeReason, ChangeSet, DialogChangesetError, KeyType, OrderedSink, RebuildPolicy,
    SortReason, Strategy, ValueType,
};

/// Adapts an ordered structure to the target order of sorted change sets.
pub trait SortedChangeSetAdaptor<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    /// Apply `changes`, returning the strategy that was used.
    fn adapt(&mut self, changes: &ChangeSet<Key, Value>) -> Result<Strategy, DialogChangesetError>;
}

/// Keeps an [`OrderedSink`] in agreement with a stream of [`ChangeSet`]s.
#[derive(Clone, Debug)]
pub struct SortedListReconciler<Sink> {
    sink: Sink,
    policy: RebuildPolicy,
}

impl<Sink> SortedListReconciler<Sink> {
    /// Create a reconciler over `sink` that rebuilds data-changed batches
    /// carrying more than `refresh_threshold` structural changes.
    pub fn new(sink: Sink, refresh_threshold: usize) -> Self {
        Self::with_policy(sink, RebuildPolicy::new(refresh_threshold))
    }

    /// Create a reconciler over `sink` with an explicit [`RebuildPolicy`].
    pub fn with_policy(sink: Sink, policy: RebuildPolicy) -> Self {
        Self { sink, policy }
    }

    /// The policy consulted for every batch.
    pub fn policy(&self) -> &RebuildPolicy {
        &self.policy
    }

    /// Read access to the backing sink.
    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Mutable access to the backing sink, for draining notifications and
    /// similar bookkeeping between batches. Positional edits made through it
    /// invalidate the indices of subsequent batches.
    pub fn sink_mut(&mut self) -> &mut Sink {
        &mut self.sink
    }

    /// Give up the reconciler and return its sink.
    pub fn into_inner(self) -> Sink {
        self.sink
    }

    /// Apply `changes` to the sink, returning the strategy that was used.
    pub fn adapt<Key, Value>(
        &mut self,
        changes: &ChangeSet<Key, Value>,
    ) -> Result<Strategy, DialogChangesetError>
    where
        Key: KeyType,
        Value: ValueType,
        Sink: OrderedSink<Value>,
    {
        let strategy = self.policy.decide(changes);

        tracing::debug!(
            reason = %changes.reason(),
            count = changes.count(),
            refreshes = changes.refreshes(),
            threshold = self.policy.refresh_threshold,
            ?strategy,
            "Adapting sorted change set"
        );

        let checked = match strategy {
            Strategy::Rebuild => self.check_target(changes),
            Strategy::Patch => self.validate(changes),
        };
        if let Err(error) = checked {
            tracing::warn!(%error, "Rejecting sorted change set");
            return Err(error);
        }

        match strategy {
            Strategy::Rebuild => self.rebuild(changes),
            Strategy::Patch => self.patch(changes),
        }

        Ok(strategy)
    }

    fn rebuild<Key, Value>(&mut self, changes: &ChangeSet<Key, Value>)
    where
        Key: KeyType,
        Value: ValueType,
        Sink: OrderedSink<Value>,
    {
        let mut window = self.sink.suspend();
        window.clear();
        window.append(changes.sorted().iter().map(|entry| entry.value.clone()));
    }

    /// A data-changed batch describes a delta against the current sink, so
    /// its target order must account for exactly its adds and removes.
    fn check_target<Key, Value>(
        &self,
        changes: &ChangeSet<Key, Value>,
    ) -> Result<(), DialogChangesetError>
    where
        Key: KeyType,
        Value: ValueType,
        Sink: OrderedSink<Value>,
    {
        if changes.reason() != SortReason::DataChanged {
            return Ok(());
        }

        let len = self.sink.len();
        match (len + changes.adds()).checked_sub(changes.removes()) {
            Some(expected) if expected == changes.sorted().len() => Ok(()),
            Some(expected) => Err(DialogChangesetError::InvalidArgument(format!(
                "Target order has {} entries, but the batch leaves {expected} items",
                changes.sorted().len()
            ))),
            None => Err(DialogChangesetError::InvalidArgument(format!(
                "Batch removes {} items from a sink of {len}",
                changes.removes()
            ))),
        }
    }

    /// Walks the batch against the sink's length as it will evolve, without
    /// mutating anything.
    fn validate<Key, Value>(&self, changes: &ChangeSet<Key, Value>) -> Result<(), DialogChangesetError>
    where
        Key: KeyType,
        Value: ValueType,
        Sink: OrderedSink<Value>,
    {
        let mut len = self.sink.len();

        for (position, change) in changes.iter().enumerate() {
            let current_index = || {
                change.current_index.ok_or(DialogChangesetError::MissingIndex {
                    position,
                    reason: change.reason,
                    field: "current index",
                })
            };
            let previous_index = || {
                change
                    .previous_index
                    .ok_or(DialogChangesetError::MissingIndex {
                        position,
                        reason: change.reason,
                        field: "previous index",
                    })
            };

            match change.reason {
                ChangeReason::Add => {
                    check_bounds(position, current_index()?, len + 1)?;
                    len += 1;
                }
                ChangeReason::Remove => {
                    check_bounds(position, current_index()?, len)?;
                    len -= 1;
                }
                ChangeReason::Update | ChangeReason::Moved => {
                    check_bounds(position, previous_index()?, len)?;
                    // The insertion happens after the removal, so it may not
                    // reach past the last item
                    check_bounds(position, current_index()?, len)?;
                }
                ChangeReason::Refresh => {
                    check_bounds(position, current_index()?, len)?;
                }
            }
        }

        Ok(())
    }

    fn patch<Key, Value>(&mut self, changes: &ChangeSet<Key, Value>)
    where
        Key: KeyType,
        Value: ValueType,
        Sink: OrderedSink<Value>,
    {
        for change in changes {
            tracing::trace!(reason = %change.reason, key = ?change.key, "Patching sorted sink");

            match (change.reason, change.previous_index, change.current_index) {
                (ChangeReason::Add, _, Some(index)) => {
                    self.sink.insert(index, change.current.clone());
                }
                (ChangeReason::Remove, _, Some(index)) => {
                    self.sink.remove_at(index);
                }
                (ChangeReason::Update, Some(previous_index), Some(index)) => {
                    self.sink.remove_at(previous_index);
                    self.sink.insert(index, change.current.clone());
                }
                (ChangeReason::Moved, Some(previous_index), Some(index)) => {
                    self.sink.remove_at(previous_index);
                    self.sink.insert(index, change.current.clone());
                }
                (ChangeReason::Refresh, _, Some(index)) => {
                    self.sink.replace(index, change.current.clone());
                }
                // Ruled out by validation
                (ChangeReason::Add | ChangeReason::Remove | ChangeReason::Refresh, _, None)
                | (ChangeReason::Update | ChangeReason::Moved, None, _)
                | (ChangeReason::Update | ChangeReason::Moved, Some(_), None) => {}
            }
        }
    }
}

impl<Key, Value, Sink> SortedChangeSetAdaptor<Key, Value> for SortedListReconciler<Sink>
where
    Key: KeyType,
    Value: ValueType,
    Sink: OrderedSink<Value>,
{
    fn adapt(&mut self, changes: &ChangeSet<Key, Value>) -> Result<Strategy, DialogChangesetError> {
        SortedListReconciler::adapt(self, changes)
    }
}

/// Ensures `index` is less than `len`.
fn check_bounds(position: usize, index: usize, len: usize) -> Result<(), DialogChangesetError> {
    if index < len {
        Ok(())
    } else {
        Err(DialogChangesetError::IndexOutOfBounds {
            position,
            index,
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Change, Entry, ListEvent, ObservableList};
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn sorted(values: &[&'static str]) -> Vec<Entry<&'static str, &'static str>> {
        values.iter().map(|value| Entry::new(*value, *value)).collect()
    }

    fn loaded(values: &[&'static str]) -> Result<SortedListReconciler<ObservableList<&'static str>>> {
        let mut changes = ChangeSet::new(SortReason::InitialLoad).with_sorted(sorted(values));
        for (index, value) in values.iter().enumerate() {
            changes.push(Change::add(*value, *value, index));
        }

        let mut reconciler = SortedListReconciler::new(ObservableList::new(), 25);
        reconciler.adapt(&changes)?;
        reconciler.sink_mut().take_events();
        Ok(reconciler)
    }

    #[test]
    fn it_rebuilds_an_initial_load_in_target_order() -> Result<()> {
        let mut reconciler = SortedListReconciler::new(ObservableList::new(), 25);
        let changes = ChangeSet::new(SortReason::InitialLoad)
            .with(Change::add("b", "b", 0))
            .with(Change::add("a", "a", 0))
            .with(Change::add("c", "c", 2))
            .with_sorted(sorted(&["a", "b", "c"]));

        assert_eq!(reconciler.adapt(&changes)?, Strategy::Rebuild);
        assert_eq!(reconciler.sink().as_slice(), &["a", "b", "c"]);
        assert_eq!(reconciler.sink_mut().take_events(), vec![ListEvent::Reset]);
        Ok(())
    }

    #[test]
    fn it_moves_an_item_to_the_end() -> Result<()> {
        let mut reconciler = loaded(&["A", "B", "C"])?;
        let changes = ChangeSet::new(SortReason::Reorder)
            .with(Change::moved("A", "A", 0, 2))
            .with_sorted(sorted(&["B", "C", "A"]));

        assert_eq!(reconciler.adapt(&changes)?, Strategy::Patch);
        assert_eq!(reconciler.sink().as_slice(), &["B", "C", "A"]);
        assert_eq!(
            reconciler.sink_mut().take_events(),
            vec![
                ListEvent::Removed { index: 0 },
                ListEvent::Inserted { index: 2 }
            ]
        );
        Ok(())
    }

    #[test]
    fn it_interprets_indices_relative_to_prior_changes() -> Result<()> {
        let mut reconciler = loaded(&["a", "c", "e"])?;
        let changes = ChangeSet::new(SortReason::DataChanged)
            .with(Change::add("b", "b", 1))
            .with(Change::add("d", "d", 3))
            .with(Change::remove("a", "a", 0))
            .with(Change::update("e", "f", "e", 3, 3))
            .with(Change::refresh("c", "c", 1))
            .with_sorted(sorted(&["b", "c", "d", "f"]));

        assert_eq!(reconciler.adapt(&changes)?, Strategy::Patch);
        assert_eq!(reconciler.sink().as_slice(), &["b", "c", "d", "f"]);
        Ok(())
    }

    #[test]
    fn it_repositions_updated_values() -> Result<()> {
        let mut reconciler = loaded(&["a", "b", "c"])?;
        let changes = ChangeSet::new(SortReason::DataChanged)
            .with(Change::update("a", "z", "a", 0, 2))
            .with_sorted(sorted(&["b", "c", "z"]));

        reconciler.adapt(&changes)?;
        assert_eq!(reconciler.sink().as_slice(), &["b", "c", "z"]);
        Ok(())
    }

    #[test]
    fn it_rebuilds_when_structural_changes_exceed_the_threshold() -> Result<()> {
        let mut reconciler = SortedListReconciler::new(ObservableList::new(), 2);
        assert_eq!(reconciler.policy().refresh_threshold, 2);
        let changes = ChangeSet::new(SortReason::DataChanged)
            .with(Change::add("a", "a", 0))
            .with(Change::add("b", "b", 1))
            .with(Change::add("c", "c", 2))
            .with_sorted(sorted(&["a", "b", "c"]));

        assert_eq!(reconciler.adapt(&changes)?, Strategy::Rebuild);
        assert_eq!(reconciler.sink().as_slice(), &["a", "b", "c"]);
        assert_eq!(reconciler.sink_mut().take_events(), vec![ListEvent::Reset]);
        Ok(())
    }

    #[test]
    fn it_replaces_refreshed_values_in_place() -> Result<()> {
        let mut reconciler = loaded(&["a", "b"])?;
        let changes = ChangeSet::new(SortReason::DataChanged)
            .with(Change::refresh("b", "b2", 1))
            .with_sorted(vec![Entry::new("a", "a"), Entry::new("b", "b2")]);

        assert_eq!(reconciler.adapt(&changes)?, Strategy::Patch);
        assert_eq!(reconciler.sink().as_slice(), &["a", "b2"]);
        assert_eq!(
            reconciler.sink_mut().take_events(),
            vec![ListEvent::Replaced { index: 1 }]
        );
        Ok(())
    }

    #[test]
    fn it_carries_refreshed_and_moved_values_on_either_path() -> Result<()> {
        let initial = ChangeSet::new(SortReason::InitialLoad)
            .with(Change::add(0u32, (0u32, 10u32), 0))
            .with(Change::add(1, (1, 20), 1))
            .with_sorted(vec![Entry::new(0, (0, 10)), Entry::new(1, (1, 20))]);
        let changes = ChangeSet::new(SortReason::DataChanged)
            .with(Change::refresh(0, (0, 30), 0))
            .with(Change::moved(0, (0, 30), 0, 1))
            .with_sorted(vec![Entry::new(1, (1, 20)), Entry::new(0, (0, 30))]);

        for (threshold, strategy) in [(usize::MAX, Strategy::Patch), (0, Strategy::Rebuild)] {
            let mut reconciler = SortedListReconciler::new(Vec::new(), threshold);
            reconciler.adapt(&initial)?;
            assert_eq!(reconciler.adapt(&changes)?, strategy);
            assert_eq!(reconciler.sink(), &vec![(1u32, 20u32), (0, 30)]);
        }
        Ok(())
    }

    #[test]
    fn it_rejects_rebuilds_without_a_matching_target_order() -> Result<()> {
        let mut reconciler = loaded(&["a", "b"])?;
        let mut strict = SortedListReconciler::new(reconciler.sink().clone(), 0);
        let changes: ChangeSet<&str, &str> = vec![Change::add("c", "c", 0)].into_iter().collect();

        assert!(matches!(
            strict.adapt(&changes),
            Err(DialogChangesetError::InvalidArgument(_))
        ));
        assert_eq!(strict.sink().as_slice(), &["a", "b"]);
        assert!(strict.sink_mut().take_events().is_empty());

        let drained = ChangeSet::new(SortReason::DataChanged)
            .with(Change::remove("a", "a", 0))
            .with(Change::remove("b", "b", 0))
            .with(Change::remove("c", "c", 0));
        assert!(matches!(
            strict.adapt(&drained),
            Err(DialogChangesetError::InvalidArgument(_))
        ));
        assert_eq!(strict.sink().as_slice(), &["a", "b"]);

        let changes = changes.with_sorted(sorted(&["c", "a", "b"]));
        assert_eq!(reconciler.adapt(&changes)?, Strategy::Patch);
        assert_eq!(reconciler.sink().as_slice(), &["c", "a", "b"]);
        Ok(())
    }

    #[test]
    fn it_rejects_out_of_range_indices_without_mutating() -> Result<()> {
        let mut reconciler = loaded(&["a", "b"])?;
        let changes = ChangeSet::new(SortReason::DataChanged)
            .with(Change::add("c", "c", 2))
            .with(Change::remove("a", "a", 0))
            .with(Change::moved("b", "b", 0, 2))
            .with_sorted(sorted(&["b", "c"]));

        assert_eq!(
            reconciler.adapt(&changes),
            Err(DialogChangesetError::IndexOutOfBounds {
                position: 2,
                index: 2,
                len: 2
            })
        );
        assert_eq!(reconciler.sink().as_slice(), &["a", "b"]);
        assert!(reconciler.sink_mut().take_events().is_empty());
        Ok(())
    }

    #[test]
    fn it_rejects_missing_indices_without_mutating() -> Result<()> {
        let mut reconciler = loaded(&["a"])?;
        let changes = ChangeSet::new(SortReason::DataChanged)
            .with(Change::add("b", "b", 1))
            .with(Change::new(ChangeReason::Moved, "a", "a").at(0));

        assert_eq!(
            reconciler.adapt(&changes),
            Err(DialogChangesetError::MissingIndex {
                position: 1,
                reason: ChangeReason::Moved,
                field: "previous index"
            })
        );
        assert_eq!(reconciler.sink().as_slice(), &["a"]);
        Ok(())
    }

    #[test]
    fn it_rejects_unrecognized_reasons_before_mutating() -> Result<()> {
        let mut reconciler = loaded(&["a", "b", "c"])?;
        let outcome = SortReason::try_from(9u8).and_then(|reason| {
            let changes = ChangeSet::new(reason)
                .with(Change::remove("a", "a", 0))
                .with_sorted(sorted(&["b", "c"]));
            reconciler.adapt(&changes)
        });

        assert!(matches!(
            outcome,
            Err(DialogChangesetError::InvalidArgument(_))
        ));
        assert_eq!(reconciler.sink().as_slice(), &["a", "b", "c"]);
        assert!(reconciler.sink_mut().take_events().is_empty());
        Ok(())
    }

    #[test]
    fn it_adapts_plain_vectors_through_the_adaptor_trait() -> Result<()> {
        fn drive<A: SortedChangeSetAdaptor<u32, char>>(
            adaptor: &mut A,
            changes: &ChangeSet<u32, char>,
        ) -> Result<Strategy, DialogChangesetError> {
            adaptor.adapt(changes)
        }

        let mut reconciler = SortedListReconciler::new(vec!['x'], 25);
        let changes = ChangeSet::new(SortReason::DataChanged)
            .with(Change::add(2, 'y', 0))
            .with_sorted(vec![Entry::new(2, 'y'), Entry::new(1, 'x')]);

        assert_eq!(drive(&mut reconciler, &changes)?, Strategy::Patch);
        assert_eq!(reconciler.into_inner(), vec!['y', 'x']);
        Ok(())
    }
}
