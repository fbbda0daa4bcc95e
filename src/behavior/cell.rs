//! # Execution Slot
//!
//! [`BehaviorCell`] is the per-actor "current behavior" cell a host embeds. It performs
//! the host side of the behavior contract:
//!
//! - every dispatch result is canonicalized against the current behavior;
//! - once the current behavior is stopped, further messages are refused;
//! - exactly one `PostStop` is processed, either by the live behavior when the host
//!   stops the actor, or absorbed by the stopped sentinel.

use thiserror::Error;
use tracing::debug;

use crate::behavior::context::{ActorContext, ActorId};
use crate::behavior::core::{Behavior, BehaviorKind};
use crate::behavior::signal::{Cause, Decision, Signal};

/// Refusals reported to the host.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The behavior already stopped; the host must stop scheduling deliveries.
    #[error("Behavior already stopped")]
    Terminated,
}

pub struct BehaviorCell<M> {
    current: Behavior<M>,
    post_stop_done: bool,
}

impl<M: 'static> BehaviorCell<M> {
    pub fn new(initial: Behavior<M>) -> Self {
        assert!(
            initial.kind() != BehaviorKind::Same && initial.kind() != BehaviorKind::Unhandled,
            "initial behavior must not be a Same/Unhandled sentinel"
        );
        Self {
            current: initial,
            post_stop_done: false,
        }
    }

    pub fn current(&self) -> &Behavior<M> {
        &self.current
    }

    pub fn is_alive(&self) -> bool {
        self.current.is_alive()
    }

    /// True once the single `PostStop` has been processed.
    pub fn is_terminated(&self) -> bool {
        self.post_stop_done
    }

    /// Delivers `PreStart`.
    pub fn start(&mut self, ctx: &mut dyn ActorContext) -> Result<(), DeliveryError> {
        self.deliver_signal(ctx, &Signal::PreStart)
    }

    pub fn deliver_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Result<(), DeliveryError> {
        if !self.current.is_alive() {
            debug!(actor = %ctx.self_id(), "Message refused, behavior stopped");
            return Err(DeliveryError::Terminated);
        }
        let returned = self.current.on_message(ctx, msg);
        self.apply(ctx.self_id(), "message", returned);
        Ok(())
    }

    pub fn deliver_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Result<(), DeliveryError> {
        if matches!(signal, Signal::PostStop) {
            self.stop(ctx);
            return Ok(());
        }
        if !self.current.is_alive() {
            debug!(actor = %ctx.self_id(), signal = signal.name(), "Signal refused, behavior stopped");
            return Err(DeliveryError::Terminated);
        }
        let returned = self.current.on_signal(ctx, signal);
        self.apply(ctx.self_id(), signal.name(), returned);
        Ok(())
    }

    /// Delivers `ChildFailed` and returns the decision the behavior registered,
    /// `Escalate` if it registered none.
    pub fn deliver_child_failure(
        &mut self,
        ctx: &mut dyn ActorContext,
        child: ActorId,
        cause: Cause,
    ) -> Result<Decision, DeliveryError> {
        let signal = Signal::child_failed(child, cause);
        self.deliver_signal(ctx, &signal)?;
        let decision = signal.decision_slot().map_or(Decision::Escalate, |slot| slot.decision());
        debug!(actor = %ctx.self_id(), ?decision, "Child failure decided");
        Ok(decision)
    }

    /// Processes the implicit `PostStop` once and leaves the cell stopped.
    pub fn stop(&mut self, ctx: &mut dyn ActorContext) {
        if self.post_stop_done {
            return;
        }
        self.post_stop_done = true;
        let returned = self.current.on_signal(ctx, &Signal::PostStop);
        self.current.settle(returned);
        if self.current.is_alive() {
            self.current.settle(Behavior::stopped());
        }
        // A cell installed with `stopped_with` still holds its cleanup.
        if matches!(self.current, Behavior::Stopped(Some(_))) {
            let pending = self.current.take();
            self.current.settle(pending);
        }
        debug!(actor = %ctx.self_id(), "PostStop processed");
    }

    fn apply(&mut self, actor: &ActorId, input: &'static str, returned: Behavior<M>) {
        let next = returned.kind();
        self.current.settle(returned);
        debug!(%actor, input, ?next, alive = self.current.is_alive(), "Dispatched");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::handlers::{partial, receive_message, Input};
    use crate::testkit::EffectfulContext;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn refuses_messages_after_stop() {
        let mut cell = BehaviorCell::new(receive_message(|m: &u8| {
            if *m == 0 {
                Behavior::stopped()
            } else {
                Behavior::Same
            }
        }));
        let mut ctx = EffectfulContext::new("cell");
        cell.deliver_message(&mut ctx, &1).unwrap();
        cell.deliver_message(&mut ctx, &0).unwrap();
        assert!(!cell.is_alive());
        assert_eq!(cell.deliver_message(&mut ctx, &1), Err(DeliveryError::Terminated));
        // The implicit PostStop is still accepted once.
        cell.deliver_signal(&mut ctx, &Signal::PostStop).unwrap();
        assert!(cell.is_terminated());
    }

    #[test]
    fn post_stop_reaches_live_behavior_once() {
        let post_stops = Arc::new(AtomicUsize::new(0));
        let counter = post_stops.clone();
        let mut cell = BehaviorCell::new(partial::<u8, _>(move |_ctx, input| match input {
            Input::Signal(Signal::PostStop) => {
                counter.fetch_add(1, Ordering::SeqCst);
                Some(Behavior::Same)
            }
            _ => None,
        }));
        let mut ctx = EffectfulContext::new("cell");
        cell.stop(&mut ctx);
        cell.stop(&mut ctx);
        cell.deliver_signal(&mut ctx, &Signal::PostStop).unwrap();
        assert_eq!(post_stops.load(Ordering::SeqCst), 1);
        assert!(!cell.is_alive());
    }

    #[test]
    fn initial_stopped_cleanup_runs_on_stop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let mut cell = BehaviorCell::<u8>::new(Behavior::stopped_with(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let mut ctx = EffectfulContext::new("cell");
        assert_eq!(cell.start(&mut ctx), Err(DeliveryError::Terminated));
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        cell.stop(&mut ctx);
        cell.stop(&mut ctx);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(cell.is_terminated());
    }

    #[test]
    fn unanswered_child_failure_escalates() {
        let mut cell = BehaviorCell::new(receive_message(|_m: &u8| Behavior::Same));
        let mut ctx = EffectfulContext::new("parent");
        let decision = cell
            .deliver_child_failure(&mut ctx, ActorId::new(2, "kid"), Arc::new(std::io::Error::other("x")))
            .unwrap();
        assert_eq!(decision, Decision::Escalate);
    }
}
