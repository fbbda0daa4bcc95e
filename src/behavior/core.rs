//! # Behavior Core
//!
//! A [`Behavior`] describes how an actor reacts to the next signal or message and
//! which behavior to use afterwards.
//!
//! ## Sentinels
//!
//! Three variants are pseudo-behaviors that only make sense as *return values*:
//!
//! - [`Behavior::Same`]: keep whatever is currently active.
//! - [`Behavior::Unhandled`]: the input was not handled; callers may fall back.
//! - [`Behavior::Stopped`]: terminate, optionally running a cleanup action.
//!
//! [`canonicalize`] reconciles a returned behavior against the current one so that
//! `Same` and `Unhandled` never become the current behavior, and a stop cleanup runs
//! exactly once, at the moment the sentinel is recognized.
//!
//! ## Dispatch
//!
//! Dispatch borrows the current behavior mutably and returns the raw next behavior.
//! The caller then applies [`canonicalize`] (or [`Behavior::settle`] in place). Messages
//! are passed by reference so combinators can offer the same input to more than one
//! child.

use std::fmt;

use crate::behavior::context::ActorContext;
use crate::behavior::signal::Signal;

/// Action run once when a behavior stops.
pub type Cleanup = Box<dyn FnOnce() + Send>;

/// Dispatch entry points of a live behavior.
pub trait Receive<M>: Send {
    fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<M>;

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M>;
}

/// A live behavior or one of the three sentinels.
pub enum Behavior<M> {
    Same,
    Unhandled,
    Stopped(Option<Cleanup>),
    Active(Box<dyn Receive<M>>),
}

/// Tag of a [`Behavior`], for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorKind {
    Same,
    Unhandled,
    Stopped,
    Active,
}

impl<M: 'static> Behavior<M> {
    pub fn same() -> Self {
        Behavior::Same
    }

    pub fn unhandled() -> Self {
        Behavior::Unhandled
    }

    pub fn stopped() -> Self {
        Behavior::Stopped(None)
    }

    /// Stops and runs `cleanup` once canonicalization recognizes the stop.
    pub fn stopped_with(cleanup: impl FnOnce() + Send + 'static) -> Self {
        Behavior::Stopped(Some(Box::new(cleanup)))
    }

    pub fn from_receive(receive: impl Receive<M> + 'static) -> Self {
        Behavior::Active(Box::new(receive))
    }

    /// Handles nothing: every signal and message is unhandled.
    pub fn empty() -> Self {
        Behavior::from_receive(Empty)
    }

    /// Accepts everything and never changes.
    pub fn ignore() -> Self {
        Behavior::from_receive(Ignore)
    }
}

impl<M> Behavior<M> {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Same => BehaviorKind::Same,
            Behavior::Unhandled => BehaviorKind::Unhandled,
            Behavior::Stopped(_) => BehaviorKind::Stopped,
            Behavior::Active(_) => BehaviorKind::Active,
        }
    }

    /// False exactly for the stopped sentinel.
    pub fn is_alive(&self) -> bool {
        !matches!(self, Behavior::Stopped(_))
    }

    /// True only for the `Unhandled` sentinel itself; no behavior is unhandled by structure.
    pub fn is_unhandled(&self) -> bool {
        matches!(self, Behavior::Unhandled)
    }

    /// Delivers a signal. `Stopped` absorbs `PostStop`; any other sentinel dispatch is a
    /// contract violation.
    pub fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<M> {
        match self {
            Behavior::Active(receive) => receive.on_signal(ctx, signal),
            Behavior::Stopped(_) if matches!(signal, Signal::PostStop) => Behavior::Same,
            Behavior::Stopped(_) => {
                panic!("signal {signal:?} dispatched into a stopped behavior")
            }
            Behavior::Same | Behavior::Unhandled => {
                panic!("signal {signal:?} dispatched into sentinel {:?}", self.kind())
            }
        }
    }

    /// Delivers a message. Only live behaviors accept messages.
    pub fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        match self {
            Behavior::Active(receive) => receive.on_message(ctx, msg),
            Behavior::Stopped(_) => panic!("message dispatched into a stopped behavior"),
            Behavior::Same | Behavior::Unhandled => {
                panic!("message dispatched into sentinel {:?}", self.kind())
            }
        }
    }

    /// In-place [`canonicalize`]: `self` becomes the canonical successor of `returned`.
    pub fn settle(&mut self, returned: Behavior<M>) {
        let current = std::mem::replace(self, Behavior::Same);
        *self = canonicalize(current, returned);
    }

    /// Takes the behavior out of a slot, leaving a transient `Same` behind.
    pub(crate) fn take(&mut self) -> Behavior<M> {
        std::mem::replace(self, Behavior::Same)
    }
}

impl<M> fmt::Debug for Behavior<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Stopped(cleanup) => f
                .debug_struct("Stopped")
                .field("cleanup_pending", &cleanup.is_some())
                .finish(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// Reconciles a raw returned behavior against the current one.
///
/// 1. `Stopped` runs its cleanup now and yields a bare `Stopped`.
/// 2. `Same` yields `current`.
/// 3. `Unhandled` yields `current`.
/// 4. Anything else replaces `current`.
pub fn canonicalize<M>(current: Behavior<M>, returned: Behavior<M>) -> Behavior<M> {
    match returned {
        Behavior::Stopped(cleanup) => {
            if let Some(cleanup) = cleanup {
                cleanup();
            }
            Behavior::Stopped(None)
        }
        Behavior::Same | Behavior::Unhandled => current,
        next @ Behavior::Active(_) => next,
    }
}

/// Free-function form of [`Behavior::is_alive`].
pub fn is_alive<M>(behavior: &Behavior<M>) -> bool {
    behavior.is_alive()
}

/// Free-function form of [`Behavior::is_unhandled`].
pub fn is_unhandled<M>(behavior: &Behavior<M>) -> bool {
    behavior.is_unhandled()
}

struct Empty;

impl<M> Receive<M> for Empty {
    fn on_signal(&mut self, _ctx: &mut dyn ActorContext, _signal: &Signal) -> Behavior<M> {
        Behavior::Unhandled
    }

    fn on_message(&mut self, _ctx: &mut dyn ActorContext, _msg: &M) -> Behavior<M> {
        Behavior::Unhandled
    }
}

struct Ignore;

impl<M> Receive<M> for Ignore {
    fn on_signal(&mut self, _ctx: &mut dyn ActorContext, _signal: &Signal) -> Behavior<M> {
        Behavior::Same
    }

    fn on_message(&mut self, _ctx: &mut dyn ActorContext, _msg: &M) -> Behavior<M> {
        Behavior::Same
    }
}
