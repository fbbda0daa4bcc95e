//! # Handler Builders
//!
//! Leaf behaviors built from closures:
//!
//! - [`total`]: one total function over signals and messages, no fallback.
//! - [`partial`]: a partial function over signals and messages; unmatched inputs are
//!   unhandled, except `PreRestart`/`PostRestart` which fall back to the stop/start path.
//! - [`receive_message`]: stateless reactor over messages; signals are unhandled.
//! - [`receive`]: like `receive_message` but also hands over the context.
//! - [`receive_partial`]: partial reactor over messages.
//! - [`effect`]: runs a side effect per message and stays the same.

use tracing::debug;

use crate::behavior::context::ActorContext;
use crate::behavior::core::{Behavior, Receive};
use crate::behavior::signal::Signal;

/// Either kind of input a behavior can receive.
#[derive(Debug)]
pub enum Input<'a, M> {
    Signal(&'a Signal),
    Message(&'a M),
}

/// Total handler over signals and messages.
pub fn total<M, F>(handler: F) -> Behavior<M>
where
    M: 'static,
    F: FnMut(&mut dyn ActorContext, Input<'_, M>) -> Behavior<M> + Send + 'static,
{
    Behavior::from_receive(Total { handler })
}

struct Total<F> {
    handler: F,
}

impl<M, F> Receive<M> for Total<F>
where
    F: FnMut(&mut dyn ActorContext, Input<'_, M>) -> Behavior<M> + Send,
{
    fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<M> {
        (self.handler)(ctx, Input::Signal(signal))
    }

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        (self.handler)(ctx, Input::Message(msg))
    }
}

/// Partial handler over signals and messages. Returning `None` means "not matched".
///
/// Unmatched `PreRestart` stops and unwatches every child, then redelivers as
/// `PostStop`. Unmatched `PostRestart` redelivers as `PreStart`. Handlers that only
/// cover the happy path therefore still restart correctly.
pub fn partial<M, F>(handler: F) -> Behavior<M>
where
    M: 'static,
    F: FnMut(&mut dyn ActorContext, Input<'_, M>) -> Option<Behavior<M>> + Send + 'static,
{
    Behavior::from_receive(Partial { handler })
}

struct Partial<F> {
    handler: F,
}

impl<M, F> Receive<M> for Partial<F>
where
    F: FnMut(&mut dyn ActorContext, Input<'_, M>) -> Option<Behavior<M>> + Send,
{
    fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<M> {
        if let Some(next) = (self.handler)(ctx, Input::Signal(signal)) {
            return next;
        }
        match signal {
            Signal::PreRestart(_) => {
                stop_children(ctx);
                self.on_signal(ctx, &Signal::PostStop)
            }
            Signal::PostRestart(_) => self.on_signal(ctx, &Signal::PreStart),
            _ => Behavior::Unhandled,
        }
    }

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        (self.handler)(ctx, Input::Message(msg)).unwrap_or(Behavior::Unhandled)
    }
}

fn stop_children(ctx: &mut dyn ActorContext) {
    for child in ctx.children() {
        ctx.unwatch(&child);
        if let Err(e) = ctx.stop(&child) {
            debug!(%child, error = %e, "Child already gone");
        }
    }
}

/// Stateless reactor: maps messages to next behaviors, leaves every signal unhandled.
/// A `ChildFailed` reaching it therefore escalates.
pub fn receive_message<M, F>(handler: F) -> Behavior<M>
where
    M: 'static,
    F: FnMut(&M) -> Behavior<M> + Send + 'static,
{
    Behavior::from_receive(Reactor { handler })
}

struct Reactor<F> {
    handler: F,
}

impl<M, F> Receive<M> for Reactor<F>
where
    F: FnMut(&M) -> Behavior<M> + Send,
{
    fn on_signal(&mut self, _ctx: &mut dyn ActorContext, _signal: &Signal) -> Behavior<M> {
        Behavior::Unhandled
    }

    fn on_message(&mut self, _ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        (self.handler)(msg)
    }
}

/// Context-aware reactor: like [`receive_message`] with the context on every message.
pub fn receive<M, F>(handler: F) -> Behavior<M>
where
    M: 'static,
    F: FnMut(&mut dyn ActorContext, &M) -> Behavior<M> + Send + 'static,
{
    Behavior::from_receive(ContextReactor { handler })
}

struct ContextReactor<F> {
    handler: F,
}

impl<M, F> Receive<M> for ContextReactor<F>
where
    F: FnMut(&mut dyn ActorContext, &M) -> Behavior<M> + Send,
{
    fn on_signal(&mut self, _ctx: &mut dyn ActorContext, _signal: &Signal) -> Behavior<M> {
        Behavior::Unhandled
    }

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        (self.handler)(ctx, msg)
    }
}

/// Partial reactor over messages: `None` means unhandled. Signals are unhandled.
pub fn receive_partial<M, F>(handler: F) -> Behavior<M>
where
    M: 'static,
    F: FnMut(&M) -> Option<Behavior<M>> + Send + 'static,
{
    Behavior::from_receive(PartialReactor { handler })
}

struct PartialReactor<F> {
    handler: F,
}

impl<M, F> Receive<M> for PartialReactor<F>
where
    F: FnMut(&M) -> Option<Behavior<M>> + Send,
{
    fn on_signal(&mut self, _ctx: &mut dyn ActorContext, _signal: &Signal) -> Behavior<M> {
        Behavior::Unhandled
    }

    fn on_message(&mut self, _ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        (self.handler)(msg).unwrap_or(Behavior::Unhandled)
    }
}

/// Side-effecting leaf: runs `effect` for each message and always stays the same.
pub fn effect<M, F>(effect: F) -> Behavior<M>
where
    M: 'static,
    F: FnMut(&M) + Send + 'static,
{
    Behavior::from_receive(Effect { effect })
}

struct Effect<F> {
    effect: F,
}

impl<M, F> Receive<M> for Effect<F>
where
    F: FnMut(&M) + Send,
{
    fn on_signal(&mut self, _ctx: &mut dyn ActorContext, _signal: &Signal) -> Behavior<M> {
        Behavior::Unhandled
    }

    fn on_message(&mut self, _ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        (self.effect)(msg);
        Behavior::Same
    }
}
