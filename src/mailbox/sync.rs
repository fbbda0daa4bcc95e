//! Synchronous inbox.
//!
//! A plain FIFO queue with a typed reference that appends to it. Nothing is delivered
//! anywhere on its own; the owner drains it with [`SyncInbox::take_next`] or
//! [`SyncInbox::take_all`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::behavior::context::{ActorId, ActorRef};

pub struct SyncInbox<M> {
    id: ActorId,
    queue: Arc<Mutex<VecDeque<M>>>,
}

impl<M: Send + 'static> SyncInbox<M> {
    pub fn new(name: &str) -> Self {
        Self {
            id: ActorId::fresh(name),
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// A reference whose `tell` appends to this inbox.
    pub fn actor_ref(&self) -> ActorRef<M> {
        let queue = self.queue.clone();
        ActorRef::new(self.id.clone(), move |msg| lock(&queue).push_back(msg))
    }

    pub fn has_messages(&self) -> bool {
        !lock(&self.queue).is_empty()
    }

    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_messages()
    }

    pub fn take_next(&self) -> Option<M> {
        lock(&self.queue).pop_front()
    }

    pub fn take_all(&self) -> Vec<M> {
        lock(&self.queue).drain(..).collect()
    }
}

// A panic while holding the lock cannot leave the queue half-modified.
fn lock<M>(queue: &Mutex<VecDeque<M>>) -> MutexGuard<'_, VecDeque<M>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_through_reference() {
        let inbox = SyncInbox::new("inbox");
        let r = inbox.actor_ref();
        assert!(!inbox.has_messages());
        r.tell(1);
        r.tell(2);
        r.clone().tell(3);
        assert_eq!(inbox.len(), 3);
        assert_eq!(inbox.take_next(), Some(1));
        assert_eq!(inbox.take_all(), vec![2, 3]);
        assert!(inbox.is_empty());
        assert_eq!(r.id(), inbox.id());
    }
}
