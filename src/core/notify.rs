//! Change notifications
//!
//! Subscribers are called synchronously, on the writer's stack, once per
//! committed write. Independently of callbacks, a pending flag lets a reader
//! poll for "something changed since I last looked", so a burst of writes
//! collapses into a single refresh.

use std::fmt;

use crate::core::model::{Attribute, EntityKind};

/// What happened to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Updated,
    /// Written as the counterpart of another update
    Propagated,
    Deleted,
}

/// A committed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChanged {
    pub entity: EntityKind,
    pub id: i64,
    /// The attribute written, `None` for inserts and deletes
    pub attribute: Option<Attribute>,
    pub kind: ChangeKind,
}

type Subscriber = Box<dyn FnMut(&RecordChanged)>;

#[derive(Default)]
pub struct ChangeFeed {
    subscribers: Vec<Subscriber>,
    pending: bool,
    generation: u64,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&RecordChanged) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    pub fn publish(&mut self, change: RecordChanged) {
        self.pending = true;
        self.generation += 1;
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&change);
        }
    }

    /// Returns true once after any number of publishes, then resets
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Total number of changes published
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending)
            .field("generation", &self.generation)
            .finish()
    }
}
