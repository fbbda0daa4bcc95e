//! The mailbox's single eviction timer.
//!
//! [`TimerSlot`] holds at most one armed kick. Re-arming always cancels the previous
//! handle first, and the slot is the only place a kick gets scheduled.

use std::sync::Arc;

use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::behavior::context::Cancellable;

/// Schedules a single wake-up of the mailbox at `at`.
pub trait Scheduler: Send {
    fn schedule_kick(&mut self, at: Instant) -> Cancellable;
}

/// Sleeps on the tokio timer and invokes `kick` when the deadline is reached.
pub struct TokioScheduler {
    kick: Arc<dyn Fn() + Send + Sync>,
}

impl TokioScheduler {
    pub fn new(kick: impl Fn() + Send + Sync + 'static) -> Self {
        Self { kick: Arc::new(kick) }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_kick(&mut self, at: Instant) -> Cancellable {
        let kick = self.kick.clone();
        let handle = tokio::spawn(async move {
            sleep_until(at).await;
            kick();
        });
        Cancellable::new(move || handle.abort())
    }
}

pub struct TimerSlot<S> {
    scheduler: S,
    armed: Option<(Instant, Cancellable)>,
}

impl<S: Scheduler> TimerSlot<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            armed: None,
        }
    }

    /// Deadline of the currently armed kick.
    pub fn deadline(&self) -> Option<Instant> {
        self.armed.as_ref().map(|(at, _)| *at)
    }

    /// Makes the armed kick match `next`. `None` leaves the slot empty.
    pub fn rearm(&mut self, next: Option<Instant>) {
        if self.deadline() == next {
            return;
        }
        self.clear();
        if let Some(at) = next {
            trace!(?at, "Timer armed");
            self.armed = Some((at, self.scheduler.schedule_kick(at)));
        }
    }

    /// Cancels the armed kick, if any.
    pub fn clear(&mut self) {
        if let Some((_, handle)) = self.armed.take() {
            handle.cancel();
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<S> Drop for TimerSlot<S> {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.armed.take() {
            handle.cancel();
        }
    }
}
