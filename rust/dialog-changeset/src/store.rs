use hashbrown::HashMap;

use crate::{ChangeReason, ChangeSet, KeyType, ValueType};

/// A keyed collection that follows the value effect of [`ChangeSet`]s.
///
/// Adds and updates upsert, removals delete, and refreshes and moves have no
/// effect on stored values. Removing an absent key is a no-op.
#[derive(Clone, Debug)]
pub struct KeyedStore<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    data: HashMap<Key, Value>,
}

impl<Key, Value> Default for KeyedStore<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Key, Value> KeyedStore<Key, Value>
where
    Key: KeyType,
    Value: ValueType,
{
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Applies every change of `changes`, in order.
    ///
    /// When the store is empty, storage is pre-sized for the batch so that an
    /// initial load does not rehash repeatedly.
    pub fn integrate(&mut self, changes: &ChangeSet<Key, Value>) {
        self.presize(changes.count());

        for change in changes {
            match change.reason {
                ChangeReason::Add | ChangeReason::Update => {
                    self.data.insert(change.key.clone(), change.current.clone());
                }
                ChangeReason::Remove => {
                    self.data.remove(&change.key);
                }
                ChangeReason::Refresh | ChangeReason::Moved => {}
            }
        }
    }

    /// Retrieves the value stored under `key`, if any.
    pub fn lookup(&self, key: &Key) -> Option<&Value> {
        self.data.get(key)
    }

    /// Whether a value is stored under `key`.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.data.contains_key(key)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn add_or_update(&mut self, value: Value, key: Key) {
        self.data.insert(key, value);
    }

    /// Stores every `(value, key)` pair, pre-sizing like [`KeyedStore::integrate`].
    pub fn add_or_update_all<Items>(&mut self, items: Items)
    where
        Items: IntoIterator<Item = (Value, Key)>,
    {
        let items = items.into_iter();
        self.presize(items.size_hint().0);

        for (value, key) in items {
            self.data.insert(key, value);
        }
    }

    /// Removes the value stored under `key` (if it is present).
    pub fn remove(&mut self, key: &Key) {
        self.data.remove(key);
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Number of stored values.
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Alias of [`KeyedStore::count`].
    pub fn len(&self) -> usize {
        self.count()
    }

    /// Whether the store holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The stored keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.data.keys()
    }

    /// The stored values, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.data.values()
    }

    /// The stored key/value pairs, in no particular order.
    pub fn key_values(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.data.iter()
    }

    fn presize(&mut self, hint: usize) {
        if self.data.is_empty() && hint > self.data.capacity() {
            tracing::debug!(capacity = hint, "Pre-sizing empty keyed store");
            self.data = HashMap::with_capacity(hint);
        }
    }
}
