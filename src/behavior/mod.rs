//! Typed behaviors and the host contract they run under.

pub mod cell;
pub mod combinators;
pub mod context;
pub mod core;
pub mod deferred;
pub mod handlers;
pub mod signal;

pub use cell::{BehaviorCell, DeliveryError};
pub use combinators::{and, or};
pub use context::{ActorContext, ActorId, ActorRef, AnyMessage, Cancellable, ContextError, Props};
pub use self::core::{canonicalize, is_alive, is_unhandled, Behavior, BehaviorKind, Cleanup, Receive};
pub use deferred::{deferred, synchronous_self, with_self};
pub use handlers::{effect, partial, receive, receive_message, receive_partial, total, Input};
pub use signal::{Cause, Decision, DecisionSlot, Signal};
