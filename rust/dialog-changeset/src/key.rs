use std::hash::Hash;

/// A key that identifies a value in a [`KeyedStore`](crate::KeyedStore) or a
/// [`ChangeSet`](crate::ChangeSet).
pub trait KeyType: std::fmt::Debug + Clone + Eq + Hash {}

impl<T> KeyType for T where T: std::fmt::Debug + Clone + Eq + Hash {}

/// A value that may be held by a [`KeyedStore`](crate::KeyedStore) or an
/// ordered sink.
pub trait ValueType: std::fmt::Debug + Clone {}

impl<T> ValueType for T where T: std::fmt::Debug + Clone {}
