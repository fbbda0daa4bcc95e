//! # Deadline Mailbox State
//!
//! The bookkeeping behind [`DeadlineMailbox`](crate::mailbox::DeadlineMailbox), kept free of
//! channels and clocks so every transition can be driven directly:
//!
//! - waiting queries in arrival order, indexed by deadline;
//! - a bounded buffer of deliveries no waiting query accepted;
//! - the set of watched targets whose termination is accepted;
//! - a single [`TimerSlot`] always armed for the earliest outstanding deadline.
//!
//! A query is answered at most once: it leaves both the queue and the deadline index
//! before its caller hears anything.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::behavior::context::ActorId;
use crate::mailbox::error::MailboxError;
use crate::mailbox::query::{Delivery, Query};
use crate::mailbox::timer::{Scheduler, TimerSlot};

struct Waiting<M> {
    seq: u64,
    query: Query<M>,
}

pub struct MailboxState<M, S> {
    capacity: usize,
    messages: VecDeque<Delivery<M>>,
    queries: VecDeque<Waiting<M>>,
    deadlines: BTreeSet<(Instant, u64)>,
    next_seq: u64,
    overflow_warned: bool,
    watching: HashSet<ActorId>,
    timer: TimerSlot<S>,
}

impl<M, S: Scheduler> MailboxState<M, S> {
    pub fn new(capacity: usize, scheduler: S) -> Self {
        assert!(capacity > 0, "mailbox capacity must be positive");
        Self {
            capacity,
            messages: VecDeque::new(),
            queries: VecDeque::new(),
            deadlines: BTreeSet::new(),
            next_seq: 0,
            overflow_warned: false,
            watching: HashSet::new(),
            timer: TimerSlot::new(scheduler),
        }
    }

    pub fn pending_queries(&self) -> usize {
        self.queries.len()
    }

    pub fn buffered(&self) -> usize {
        self.messages.len()
    }

    /// Deadline the timer is currently armed for.
    pub fn timer_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn is_watching(&self, target: &ActorId) -> bool {
        self.watching.contains(target)
    }

    pub fn overflow_warned(&self) -> bool {
        self.overflow_warned
    }

    pub fn scheduler(&self) -> &S {
        self.timer.scheduler()
    }

    /// Answers from the buffer if a buffered delivery matches, otherwise parks the query.
    pub fn on_query(&mut self, query: Query<M>) {
        if let Some(index) = self.messages.iter().position(|d| query.accepts(d)) {
            if let Some(delivery) = self.messages.remove(index) {
                if let Err(unsent) = query.answer(delivery) {
                    trace!("Caller gone before answer, delivery kept");
                    self.messages.insert(index, unsent);
                }
                return;
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.deadlines.insert((query.deadline(), seq));
        self.queries.push_back(Waiting { seq, query });
        self.rearm();
    }

    /// Hands the delivery to the earliest-arrived query that accepts it, or buffers it.
    pub fn on_delivery(&mut self, delivery: Delivery<M>) {
        let mut delivery = delivery;
        loop {
            let Some(index) = self.queries.iter().position(|w| w.query.accepts(&delivery)) else {
                self.buffer(delivery);
                break;
            };
            let Some(waiting) = self.queries.remove(index) else {
                break;
            };
            self.deadlines.remove(&(waiting.query.deadline(), waiting.seq));
            match waiting.query.answer(delivery) {
                Ok(()) => break,
                Err(unsent) => {
                    trace!("Caller gone before answer, trying next query");
                    delivery = unsent;
                }
            }
        }
        self.rearm();
    }

    /// Idempotent.
    pub fn watch(&mut self, target: ActorId) {
        self.watching.insert(target);
    }

    pub fn unwatch(&mut self, target: &ActorId) {
        self.watching.remove(target);
    }

    /// Accepts the termination of a watched target as a delivery. The registration is
    /// consumed, so each target terminates at most once.
    pub fn on_terminated(&mut self, target: ActorId) -> bool {
        if !self.watching.remove(&target) {
            debug!(%target, "Termination of unwatched actor ignored");
            return false;
        }
        self.on_delivery(Delivery::Terminated(target));
        true
    }

    /// Fails every query whose deadline is at or before `now`, in deadline order.
    ///
    /// The kick that triggered this call is spent, so the timer is re-armed even if
    /// nothing expired; a scheduler firing early only costs another kick.
    pub fn on_kick(&mut self, now: Instant) {
        self.timer.clear();
        while let Some(&(deadline, seq)) = self.deadlines.first() {
            if deadline > now {
                break;
            }
            self.deadlines.pop_first();
            let Some(index) = self.queries.iter().position(|w| w.seq == seq) else {
                continue;
            };
            if let Some(waiting) = self.queries.remove(index) {
                trace!(seq, "Query timed out");
                waiting.query.fail(MailboxError::Timeout);
            }
        }
        self.rearm();
    }

    /// Fails outstanding queries with `Closed` and drops the buffer.
    pub fn shutdown(&mut self) {
        self.timer.clear();
        self.deadlines.clear();
        let failed = self.queries.len();
        for waiting in self.queries.drain(..) {
            waiting.query.fail(MailboxError::Closed);
        }
        let dropped = self.messages.len();
        self.messages.clear();
        debug!(failed, dropped, "Mailbox state cleared");
    }

    fn buffer(&mut self, delivery: Delivery<M>) {
        if self.messages.len() >= self.capacity {
            if !self.overflow_warned {
                self.overflow_warned = true;
                warn!(capacity = self.capacity, "Mailbox full, dropping newest deliveries");
            }
            return;
        }
        self.messages.push_back(delivery);
    }

    fn rearm(&mut self) {
        let next = self.deadlines.first().map(|(at, _)| *at);
        self.timer.rearm(next);
    }
}
