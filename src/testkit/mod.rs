//! # Test Tooling
//!
//! Runtime-free helpers for exercising behaviors and mailboxes:
//!
//! - [`EffectfulContext`]: an [`ActorContext`](crate::behavior::ActorContext) that records
//!   every request as an [`Effect`].
//! - [`BehaviorTestKit`]: drives a behavior through a
//!   [`BehaviorCell`](crate::behavior::BehaviorCell) on top of an `EffectfulContext`.
//! - [`ManualScheduler`]: a mailbox timer that only records arm and cancel requests.

mod context;
mod kit;
mod scheduler;

pub use context::{Effect, EffectfulContext, ScheduledMessage};
pub use kit::BehaviorTestKit;
pub use scheduler::{ManualScheduler, TimerEvent};
