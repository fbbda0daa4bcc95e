//! # Combinators
//!
//! Structural composition of behaviors.
//!
//! - [`or`]: fallback chain. The left side sees every input first; the right side only
//!   sees inputs the left side left unhandled.
//! - [`and`]: parallel combination. Both sides see every input.
//! - [`Behavior::widen`] / [`Behavior::narrow`]: change the message type a behavior
//!   accepts.
//!
//! Combinators keep their children in place and canonicalize them after every dispatch.
//! While both children live the combinator reports `Same`. Once one side dies the
//! survivor is returned and replaces the combinator for good; if both die the result
//! is `Stopped`.

use crate::behavior::context::ActorContext;
use crate::behavior::core::{Behavior, Receive};
use crate::behavior::signal::Signal;

/// Fallback chain: try `left`, retry unhandled inputs against `right`.
pub fn or<M: 'static>(left: Behavior<M>, right: Behavior<M>) -> Behavior<M> {
    Behavior::from_receive(Or { left, right })
}

/// Parallel combination: deliver every input to both sides.
pub fn and<M: 'static>(left: Behavior<M>, right: Behavior<M>) -> Behavior<M> {
    Behavior::from_receive(And { left, right })
}

impl<M: 'static> Behavior<M> {
    /// `self` first, `other` for whatever `self` leaves unhandled.
    pub fn or_else(self, other: Behavior<M>) -> Behavior<M> {
        or(self, other)
    }

    /// `self` and `other` side by side.
    pub fn and_also(self, other: Behavior<M>) -> Behavior<M> {
        and(self, other)
    }

    /// Accepts a wider message type `W`. Messages `select` maps to `None` are
    /// unhandled and never reach the inner behavior. The widening persists across
    /// every behavior change of the inner behavior.
    pub fn widen<W, F>(self, select: F) -> Behavior<W>
    where
        W: 'static,
        F: FnMut(&W) -> Option<M> + Send + 'static,
    {
        match self {
            Behavior::Same => Behavior::Same,
            Behavior::Unhandled => Behavior::Unhandled,
            Behavior::Stopped(cleanup) => Behavior::Stopped(cleanup),
            inner @ Behavior::Active(_) => Behavior::from_receive(Widened { inner, select }),
        }
    }

    /// Accepts a narrower message type `N` that is viewed as an `M` by reference, with no
    /// copy per message. Callers guarantee that `N` only carries messages `M` is prepared
    /// to handle.
    pub fn narrow<N>(self) -> Behavior<N>
    where
        N: AsRef<M> + 'static,
    {
        match self {
            Behavior::Same => Behavior::Same,
            Behavior::Unhandled => Behavior::Unhandled,
            Behavior::Stopped(cleanup) => Behavior::Stopped(cleanup),
            inner @ Behavior::Active(_) => Behavior::from_receive(Narrowed::<M, N> {
                inner,
                _narrow: std::marker::PhantomData,
            }),
        }
    }
}

/// Survivor selection shared by both combinators.
fn collapse<M: 'static>(left: &mut Behavior<M>, right: &mut Behavior<M>) -> Behavior<M> {
    match (left.is_alive(), right.is_alive()) {
        (true, true) => Behavior::Same,
        (true, false) => left.take(),
        (false, true) => right.take(),
        (false, false) => Behavior::stopped(),
    }
}

struct Or<M> {
    left: Behavior<M>,
    right: Behavior<M>,
}

impl<M: 'static> Or<M> {
    fn dispatch(
        &mut self,
        ctx: &mut dyn ActorContext,
        mut deliver: impl FnMut(&mut Behavior<M>, &mut dyn ActorContext) -> Behavior<M>,
    ) -> Behavior<M> {
        let left = deliver(&mut self.left, ctx);
        if left.is_unhandled() {
            let right = deliver(&mut self.right, ctx);
            if right.is_unhandled() {
                return Behavior::Unhandled;
            }
            self.right.settle(right);
        } else {
            self.left.settle(left);
        }
        collapse(&mut self.left, &mut self.right)
    }
}

impl<M: 'static> Receive<M> for Or<M> {
    fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<M> {
        self.dispatch(ctx, |side, ctx| side.on_signal(ctx, signal))
    }

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        self.dispatch(ctx, |side, ctx| side.on_message(ctx, msg))
    }
}

struct And<M> {
    left: Behavior<M>,
    right: Behavior<M>,
}

impl<M: 'static> And<M> {
    fn settle_both(&mut self, left: Behavior<M>, right: Behavior<M>) -> Behavior<M> {
        if left.is_unhandled() && right.is_unhandled() {
            return Behavior::Unhandled;
        }
        self.left.settle(left);
        self.right.settle(right);
        collapse(&mut self.left, &mut self.right)
    }
}

impl<M: 'static> Receive<M> for And<M> {
    fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<M> {
        let Some(outer) = signal.decision_slot() else {
            let left = self.left.on_signal(ctx, signal);
            let right = self.right.on_signal(ctx, signal);
            return self.settle_both(left, right);
        };

        // Each side decides on its own slot; silence counts as Escalate.
        let left_signal = signal.with_fresh_decision();
        let right_signal = signal.with_fresh_decision();
        let left = self.left.on_signal(ctx, &left_signal);
        let right = self.right.on_signal(ctx, &right_signal);
        if !(left.is_unhandled() && right.is_unhandled()) {
            let decided = |s: &Signal| s.decision_slot().map(|d| d.decision());
            if let (Some(l), Some(r)) = (decided(&left_signal), decided(&right_signal)) {
                outer.decide(l.resolve(r));
            }
        }
        self.settle_both(left, right)
    }

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &M) -> Behavior<M> {
        let left = self.left.on_message(ctx, msg);
        let right = self.right.on_message(ctx, msg);
        self.settle_both(left, right)
    }
}

/// Settles a wrapped inner behavior and reports the wrapper's own transition.
fn settle_inner<M: 'static, W: 'static>(inner: &mut Behavior<M>, returned: Behavior<M>) -> Behavior<W> {
    if returned.is_unhandled() {
        return Behavior::Unhandled;
    }
    inner.settle(returned);
    if inner.is_alive() {
        Behavior::Same
    } else {
        Behavior::stopped()
    }
}

struct Widened<M, F> {
    inner: Behavior<M>,
    select: F,
}

impl<M, W, F> Receive<W> for Widened<M, F>
where
    M: 'static,
    W: 'static,
    F: FnMut(&W) -> Option<M> + Send,
{
    fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<W> {
        let returned = self.inner.on_signal(ctx, signal);
        settle_inner(&mut self.inner, returned)
    }

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &W) -> Behavior<W> {
        let Some(narrow) = (self.select)(msg) else {
            return Behavior::Unhandled;
        };
        let returned = self.inner.on_message(ctx, &narrow);
        settle_inner(&mut self.inner, returned)
    }
}

struct Narrowed<M, N> {
    inner: Behavior<M>,
    _narrow: std::marker::PhantomData<fn(N)>,
}

impl<M, N> Receive<N> for Narrowed<M, N>
where
    M: 'static,
    N: AsRef<M> + 'static,
{
    fn on_signal(&mut self, ctx: &mut dyn ActorContext, signal: &Signal) -> Behavior<N> {
        let returned = self.inner.on_signal(ctx, signal);
        settle_inner(&mut self.inner, returned)
    }

    fn on_message(&mut self, ctx: &mut dyn ActorContext, msg: &N) -> Behavior<N> {
        let returned = self.inner.on_message(ctx, msg.as_ref());
        settle_inner(&mut self.inner, returned)
    }
}
