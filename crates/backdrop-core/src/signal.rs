//! Single-threaded change signals with scoped subscriptions.
//!
//! A [`Broadcast`] delivers the most recent emitted value to every live
//! [`Subscription`]. Subscribers poll their mailbox from the frame loop, so
//! several emissions between two polls coalesce into the latest one.
//! Dropping a subscription detaches it immediately.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

struct Registry<T> {
    next_id: u64,
    mailboxes: BTreeMap<u64, Option<T>>,
}

/// Source side of a change signal (viewport resize, reduced motion, ...).
pub struct Broadcast<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: Clone> Broadcast<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                mailboxes: BTreeMap::new(),
            })),
        }
    }

    /// Attach a new listener. It only sees values emitted after this call.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.mailboxes.insert(id, None);
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `value` to every live subscription.
    pub fn emit(&self, value: T) {
        for slot in self.registry.borrow_mut().mailboxes.values_mut() {
            *slot = Some(value.clone());
        }
    }

    /// Number of live subscriptions.
    pub fn listeners(&self) -> usize {
        self.registry.borrow().mailboxes.len()
    }
}

impl<T: Clone> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcast")
            .field("listeners", &self.registry.borrow().mailboxes.len())
            .finish()
    }
}

/// Listener side of a [`Broadcast`]. Detaches on drop.
pub struct Subscription<T> {
    id: u64,
    registry: Weak<RefCell<Registry<T>>>,
}

impl<T> Subscription<T> {
    /// Take the latest value delivered since the previous call, if any.
    pub fn take(&self) -> Option<T> {
        let registry = self.registry.upgrade()?;
        let mut registry = registry.borrow_mut();
        registry.mailboxes.get_mut(&self.id).and_then(Option::take)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().mailboxes.remove(&self.id);
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
