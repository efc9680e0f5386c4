#![warn(missing_docs)]

//! This crate keeps a keyed collection and a materialized sorted view of it
//! in step with a stream of [`ChangeSet`]s. Producers compute the diffs
//! elsewhere; this crate only applies them.
//!
//! Two consumers are provided:
//!
//! - [`KeyedStore`] applies the value effect of a batch (upserts and
//!   removals) and answers point lookups.
//! - [`SortedListReconciler`] patches an ordered backing structure so that it
//!   matches the batch's target order. Per batch it either rebuilds the
//!   structure from scratch or replays the positional edits in sequence, as
//!   decided by a [`RebuildPolicy`]. Both strategies leave the structure in
//!   the same state.
//!
//! ```rust
//! # fn example() -> Result<(), dialog_changeset::DialogChangesetError> {
//! use dialog_changeset::{Change, ChangeSet, Entry, SortReason, SortedListReconciler, Strategy};
//!
//! let mut reconciler = SortedListReconciler::new(Vec::new(), 25);
//!
//! let initial = ChangeSet::new(SortReason::InitialLoad)
//!     .with(Change::add(1, "a", 0))
//!     .with(Change::add(2, "b", 1))
//!     .with_sorted(vec![Entry::new(1, "a"), Entry::new(2, "b")]);
//! assert_eq!(reconciler.adapt(&initial)?, Strategy::Rebuild);
//!
//! let moved = ChangeSet::new(SortReason::Reorder)
//!     .with(Change::moved(1, "a", 0, 1))
//!     .with_sorted(vec![Entry::new(2, "b"), Entry::new(1, "a")]);
//! assert_eq!(reconciler.adapt(&moved)?, Strategy::Patch);
//! assert_eq!(reconciler.sink(), &vec!["b", "a"]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod key;
pub use key::*;

mod entry;
pub use entry::*;

mod change;
pub use change::*;

mod change_set;
pub use change_set::*;

mod error;
pub use error::*;

mod store;
pub use store::*;

mod policy;
pub use policy::*;

mod sink;
pub use sink::*;

mod reconciler;
pub use reconciler::*;
