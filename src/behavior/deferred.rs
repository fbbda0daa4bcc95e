//! # Deferred Construction
//!
//! Decorators that postpone building the real behavior until the first input:
//!
//! - [`deferred`] hands the factory the execution context.
//! - [`with_self`] hands the factory the actor's own identity.
//!
//! Both build the behavior, dispatch the triggering input to it, canonicalize the
//! result and return it, so the decorator is replaced on its first dispatch and never
//! seen again. If the built behavior leaves that first input unhandled the built
//! behavior is still installed.
//!
//! [`synchronous_self`] is different: it stays in place and owns a [`SyncInbox`]. Messages
//! the behavior sends to its own synchronous reference are processed before control
//! returns to the host.

use std::marker::PhantomData;

use tracing::debug;

use crate::behavior::context::{ActorContext, ActorId, ActorRef};
use crate::behavior::core::{canonicalize, Behavior, BehaviorKind, Receive};
use crate::behavior::signal::Signal;
use crate::mailbox::SyncInbox;

/// Defers construction until the first input and hands the factory the context.
pub fn deferred<M, F>(factory: F) -> Behavior<M>
where
    M: 'static,
    F: FnOnce(&mut dyn ActorContext) -> Behavior<M> + Send + 'static,
{
    Behavior::from_receive(Deferred {
        factory: Some(factory),
        _message: PhantomData,
    })
}

/// Defers construction until the first input and hands the factory the actor identity.
pub fn with_self<M, F>(factory: F) -> Behavior<M>
where
    M: 'static,
    F: FnOnce(ActorId) -> Behavior<M> + Send + 'static,
{
    deferred(move |ctx: &mut dyn ActorContext| factory(ctx.self_id().clone()))
}

struct Deferred<M, F> {
    factory: Option<F>,
    _message: PhantomData<fn() -> M>,
}

impl<M, F> Deferred<M, F>
where
    M: 'static,
    F: FnOnce(&mut dyn ActorContext) -> Behavior<M> + Send,
{
    fn build_and_dispatch(
        &mut self,
        ctx: &mut dyn ActorContext,
        deliver: impl FnOnce(&mut Behavior<M>, &mut dyn ActorContext) -> Behavior<M>,
    ) -> Behavior<M> {
        let factory = self
            .factory
            .take()
            .unwrap_or_else(|| panic!("deferred behavior dispatched after being replaced"));
        let mut built = factory(ctx);
        match built.kind() {
            BehaviorKind::Active => {
                let returned = deliver(&mut built, ctx);
                canonicalize(built, returned)
            }
            BehaviorKind::Stopped => built,
            kind => panic!("deferred factory returned sentinel {kind:?}"),
        }
    }
}

impl<M, F> Receive<M> for Deferred<M, F>
where
    M: 'static,
    F: FnOnce(&mut dyn ActorContext) -> Behavior<M> + Send,
{
    fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<M> {
        self.build_and_dispatch(ctx, |built, ctx| built.on_signal(ctx, signal))
    }

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        self.build_and_dispatch(ctx, |built, ctx| built.on_message(ctx, msg))
    }
}

/// Builds a behavior around a synchronous self reference.
///
/// Every dispatch runs to a fixed point: after the triggering input, messages sent to
/// the synchronous reference are processed one by one until the inbox is empty or the
/// inner behavior stops. Messages left behind by a stop are dropped.
pub fn synchronous_self<M, F>(factory: F) -> Behavior<M>
where
    M: Send + 'static,
    F: FnOnce(ActorRef<M>) -> Behavior<M>,
{
    let inbox = SyncInbox::new("syncbox");
    let behavior = factory(inbox.actor_ref());
    Behavior::from_receive(SynchronousSelf { inbox, behavior })
}

struct SynchronousSelf<M> {
    inbox: SyncInbox<M>,
    behavior: Behavior<M>,
}

impl<M: Send + 'static> SynchronousSelf<M> {
    fn run(&mut self, ctx: &mut dyn ActorContext, first: Behavior<M>) -> Behavior<M> {
        let unhandled = first.is_unhandled();
        self.behavior.settle(first);
        while self.behavior.is_alive() {
            let Some(msg) = self.inbox.take_next() else {
                break;
            };
            let next = self.behavior.on_message(ctx, &msg);
            self.behavior.settle(next);
        }

        if !self.behavior.is_alive() {
            let dropped = self.inbox.take_all().len();
            if dropped > 0 {
                debug!(dropped, "Stopped with self messages pending");
            }
            Behavior::stopped()
        } else if unhandled {
            Behavior::Unhandled
        } else {
            Behavior::Same
        }
    }
}

impl<M: Send + 'static> Receive<M> for SynchronousSelf<M> {
    fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<M> {
        let first = self.behavior.on_signal(ctx, signal);
        self.run(ctx, first)
    }

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        let first = self.behavior.on_message(ctx, msg);
        self.run(ctx, first)
    }
}
