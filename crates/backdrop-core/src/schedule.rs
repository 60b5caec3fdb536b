//! Cooperative frame scheduler.
//!
//! Effects request "run me once before the next repaint" and receive a
//! [`FrameRequest`] guard. The main loop calls [`FrameScheduler::tick`] once
//! per display refresh, which fires every outstanding request. A request
//! that is dropped before it fires is cancelled, so an effect that goes away
//! can never be called back.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

/// Identifier of one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(u64);

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    pending: BTreeSet<u64>,
}

/// Refresh-paced scheduler shared by every animation host.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    queue: Rc<RefCell<Queue>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a callback on the next tick.
    pub fn request(&self) -> FrameRequest {
        let mut queue = self.queue.borrow_mut();
        let id = queue.next_id;
        queue.next_id += 1;
        queue.pending.insert(id);
        FrameRequest {
            id: FrameId(id),
            queue: Rc::downgrade(&self.queue),
        }
    }

    /// Fire every pending request, returning the ids that fired.
    pub fn tick(&self) -> Fired {
        let pending = std::mem::take(&mut self.queue.borrow_mut().pending);
        Fired {
            ids: pending.into_iter().map(FrameId).collect(),
        }
    }

    /// Number of requests waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }
}

/// The set of requests fired by one [`FrameScheduler::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fired {
    ids: BTreeSet<FrameId>,
}

impl Fired {
    pub fn contains(&self, id: FrameId) -> bool {
        self.ids.contains(&id)
    }
}

/// Handle to a requested frame. Cancels the request on drop.
#[derive(Debug)]
pub struct FrameRequest {
    id: FrameId,
    queue: Weak<RefCell<Queue>>,
}

impl FrameRequest {
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Request the following frame on the same scheduler.
    ///
    /// The returned guard replaces `self`; if `self` had not fired yet it is
    /// cancelled.
    pub fn renew(self) -> Option<FrameRequest> {
        let queue = self.queue.upgrade()?;
        Some(FrameScheduler { queue }.request())
    }

    /// Whether the request is still waiting for a tick.
    pub fn is_pending(&self) -> bool {
        self.queue
            .upgrade()
            .is_some_and(|q| q.borrow().pending.contains(&self.id.0))
    }
}

impl Drop for FrameRequest {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.upgrade() {
            queue.borrow_mut().pending.remove(&self.id.0);
        }
    }
}
