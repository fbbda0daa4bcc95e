//! Inboxes for code that runs outside of an actor.
//!
//! - [`SyncInbox`]: a synchronous FIFO drained by its owner.
//! - [`DeadlineMailbox`]: an async mailbox where callers wait for deliveries with a
//!   deadline, optionally filtering with a predicate.

pub mod actor;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod state;
pub mod sync;
pub mod timer;

pub use actor::DeadlineMailbox;
pub use client::{MailboxClient, Queries};
pub use config::MailboxConfig;
pub use error::MailboxError;
pub use query::{Delivery, Query};
pub use state::MailboxState;
pub use sync::SyncInbox;
pub use timer::{Scheduler, TimerSlot, TokioScheduler};
