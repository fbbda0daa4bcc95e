//! A [`Scheduler`] that never fires on its own.

use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use crate::behavior::context::Cancellable;
use crate::mailbox::timer::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Armed(Instant),
    Cancelled(Instant),
}

/// Records arm and cancel requests. Clones share the same log, so a test can keep one
/// while the mailbox state owns another.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    events: Arc<Mutex<Vec<TimerEvent>>>,
    handles: Arc<Mutex<Vec<(Instant, Cancellable)>>>,
}

impl ManualScheduler {
    pub fn events(&self) -> Vec<TimerEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Deadlines of kicks that are armed and not cancelled.
    pub fn live(&self) -> Vec<Instant> {
        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(_, handle)| !handle.is_cancelled())
            .map(|(at, _)| *at)
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_kick(&mut self, at: Instant) -> Cancellable {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(TimerEvent::Armed(at));
        let events = self.events.clone();
        let handle = Cancellable::new(move || {
            events
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(TimerEvent::Cancelled(at));
        });
        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((at, handle.clone()));
        handle
    }
}
