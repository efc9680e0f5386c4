use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

/// An ordered structure that a [`SortedListReconciler`](crate::SortedListReconciler)
/// keeps in agreement with a target order.
///
/// Implementations that notify observers of positional edits may override
/// [`OrderedSink::suspend_notifications`] and
/// [`OrderedSink::resume_notifications`] so that bulk mutations are reported
/// as a single reset. Callers are expected to go through [`OrderedSink::suspend`]
/// rather than calling the pair by hand.
pub trait OrderedSink<Value> {
    /// Number of items currently held.
    fn len(&self) -> usize;

    /// Whether no items are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `value` at `index`, shifting later items back.
    ///
    /// `index` must be at most [`OrderedSink::len`].
    fn insert(&mut self, index: usize, value: Value);

    /// Remove and return the item at `index`, shifting later items forward.
    ///
    /// `index` must be less than [`OrderedSink::len`].
    fn remove_at(&mut self, index: usize) -> Value;

    /// Replace the item at `index` with `value` in place, returning the old
    /// item. Positions of other items are unaffected.
    ///
    /// `index` must be less than [`OrderedSink::len`].
    fn replace(&mut self, index: usize, value: Value) -> Value;

    /// Remove every item.
    fn clear(&mut self);

    /// Append `values` in order.
    fn append<Values>(&mut self, values: Values)
    where
        Values: IntoIterator<Item = Value>,
    {
        for value in values {
            let len = self.len();
            self.insert(len, value);
        }
    }

    /// Start a window in which per-item notifications are withheld.
    fn suspend_notifications(&mut self) {}

    /// End a window opened by [`OrderedSink::suspend_notifications`].
    fn resume_notifications(&mut self) {}

    /// Open a [`Suspension`] window that ends when the guard is dropped.
    fn suspend(&mut self) -> Suspension<'_, Value, Self>
    where
        Self: Sized,
    {
        Suspension::new(self)
    }
}

impl<Value> OrderedSink<Value> for Vec<Value> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn insert(&mut self, index: usize, value: Value) {
        Vec::insert(self, index, value);
    }

    fn remove_at(&mut self, index: usize) -> Value {
        Vec::remove(self, index)
    }

    fn replace(&mut self, index: usize, value: Value) -> Value {
        std::mem::replace(&mut self[index], value)
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn append<Values>(&mut self, values: Values)
    where
        Values: IntoIterator<Item = Value>,
    {
        self.extend(values);
    }
}

/// A scoped notification window over an [`OrderedSink`].
///
/// Notifications are suspended when the guard is created and resumed when it
/// is dropped, including on unwind. The sink is reachable through the guard
/// for the duration of the window.
pub struct Suspension<'a, Value, Sink>
where
    Sink: OrderedSink<Value>,
{
    sink: &'a mut Sink,
    value_type: PhantomData<Value>,
}

impl<'a, Value, Sink> Suspension<'a, Value, Sink>
where
    Sink: OrderedSink<Value>,
{
    /// Suspend notifications on `sink` until the returned guard is dropped.
    pub fn new(sink: &'a mut Sink) -> Self {
        sink.suspend_notifications();
        Self {
            sink,
            value_type: PhantomData,
        }
    }
}

impl<Value, Sink> Deref for Suspension<'_, Value, Sink>
where
    Sink: OrderedSink<Value>,
{
    type Target = Sink;

    fn deref(&self) -> &Self::Target {
        self.sink
    }
}

impl<Value, Sink> DerefMut for Suspension<'_, Value, Sink>
where
    Sink: OrderedSink<Value>,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.sink
    }
}

impl<Value, Sink> Drop for Suspension<'_, Value, Sink>
where
    Sink: OrderedSink<Value>,
{
    fn drop(&mut self) {
        self.sink.resume_notifications();
    }
}

/// A positional notification emitted by an [`ObservableList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListEvent {
    /// An item was inserted at `index`.
    Inserted {
        /// Position of the new item.
        index: usize,
    },
    /// The item at `index` was removed.
    Removed {
        /// Position the item was removed from.
        index: usize,
    },
    /// The item at `index` was replaced in place.
    Replaced {
        /// Position of the replaced item.
        index: usize,
    },
    /// The whole list should be re-read.
    Reset,
}

/// A list that records a [`ListEvent`] for every mutation.
///
/// While a [`Suspension`] is open, per-item events are dropped; when the
/// outermost suspension ends, a single [`ListEvent::Reset`] is recorded.
/// Pending events are drained with [`ObservableList::take_events`].
#[derive(Clone, Debug)]
pub struct ObservableList<Value> {
    items: Vec<Value>,
    events: Vec<ListEvent>,
    suspended: usize,
}

impl<Value> ObservableList<Value> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            events: Vec::new(),
            suspended: 0,
        }
    }

    /// The current items, in order.
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Iterate over the current items.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// The item at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Whether a suspension window is currently open.
    pub fn is_suspended(&self) -> bool {
        self.suspended > 0
    }

    /// Take every event recorded since the last call.
    pub fn take_events(&mut self) -> Vec<ListEvent> {
        std::mem::take(&mut self.events)
    }

    fn notify(&mut self, event: ListEvent) {
        if self.suspended == 0 {
            self.events.push(event);
        }
    }
}

impl<Value> OrderedSink<Value> for ObservableList<Value> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn insert(&mut self, index: usize, value: Value) {
        self.items.insert(index, value);
        self.notify(ListEvent::Inserted { index });
    }

    fn remove_at(&mut self, index: usize) -> Value {
        let value = self.items.remove(index);
        self.notify(ListEvent::Removed { index });
        value
    }

    fn replace(&mut self, index: usize, value: Value) -> Value {
        let previous = std::mem::replace(&mut self.items[index], value);
        self.notify(ListEvent::Replaced { index });
        previous
    }

    fn clear(&mut self) {
        self.items.clear();
        self.notify(ListEvent::Reset);
    }

    fn suspend_notifications(&mut self) {
        self.suspended += 1;
    }

    fn resume_notifications(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
        if self.suspended == 0 {
            self.events.push(ListEvent::Reset);
        }
    }
}

impl<Value> Default for ObservableList<Value> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Value> From<Vec<Value>> for ObservableList<Value> {
    fn from(items: Vec<Value>) -> Self {
        Self {
            items,
            events: Vec::new(),
            suspended: 0,
        }
    }
}
