#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Typed Behavior
//!
//! > **Composable, typed actor behaviors and a deadline mailbox for code outside actors.**
//!
//! An actor is described by a [`Behavior`](behavior::Behavior): a value that reacts to one
//! lifecycle signal or one message at a time and answers with the behavior to use next.
//! Behaviors are plain data that a host runtime owns and drives; they never hold a live
//! reference to the host. The host context is passed into every dispatch instead.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Behaviors as Return Values
//!
//! A dispatch returns either a new behavior or one of three sentinels:
//! - **`Same`**: keep the current behavior.
//! - **`Unhandled`**: the input was not handled, so a combinator may try a fallback.
//! - **`Stopped`**: terminate, optionally running a cleanup action once.
//!
//! [`canonicalize`](behavior::canonicalize) turns a returned value into the next current
//! behavior, so sentinels never become current.
//!
//! ### Composition
//!
//! Combinators build larger behaviors from smaller ones without a host:
//! - [`or`](behavior::or) tries the left side, then the right side for inputs the left
//!   side did not handle.
//! - [`and`](behavior::and) offers every input to both sides.
//! - [`widen`](behavior::Behavior::widen) and [`narrow`](behavior::Behavior::narrow) adapt
//!   the accepted message type.
//! - [`deferred`](behavior::deferred), [`with_self`](behavior::with_self) and
//!   [`synchronous_self`](behavior::synchronous_self) postpone construction until the
//!   actor exists.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Model ([`behavior`])
//! Signals, the behavior type and its combinators, the host interface
//! ([`ActorContext`](behavior::ActorContext)) and the per-actor execution slot
//! ([`BehaviorCell`](behavior::BehaviorCell)).
//!
//! ### 2. The Inboxes ([`mailbox`])
//! - [`SyncInbox`](mailbox::SyncInbox): a FIFO a behavior can send to itself through.
//! - [`DeadlineMailbox`](mailbox::DeadlineMailbox): an actor task that answers queries
//!   from non-actor code, each with its own deadline, backed by a single timer.
//!
//! ### 3. The Test Tooling ([`testkit`])
//! An effect-recording context, a synchronous behavior harness and a manual timer.
//!
//! ### 4. Observability ([`runtime`])
//! [`setup_tracing`](runtime::setup_tracing) installs a `RUST_LOG`-filtered subscriber.
//!
//! ## 🚀 Quick Start
//!
//! ```rust,ignore
//! use typed_behavior::mailbox::{DeadlineMailbox, MailboxConfig, Queries};
//!
//! let mailbox = DeadlineMailbox::<String>::spawn(MailboxConfig::default());
//! mailbox.actor_ref().tell("hello".to_string());
//! let delivery = mailbox.receive(Duration::from_millis(100)).await?;
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! RUST_LOG=debug cargo test
//! ```

pub mod behavior;
pub mod mailbox;
pub mod runtime;
pub mod testkit;
