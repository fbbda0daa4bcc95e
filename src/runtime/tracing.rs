//! # Observability & Tracing
//!
//! Everything in this crate logs through `tracing` with structured fields; nothing prints.
//! Hosts and tests that want to see the output install a subscriber with
//! [`setup_tracing`].
//!
//! ## What Gets Traced
//!
//! - **Dispatch** (`debug`): every input an execution slot processes, the kind of behavior
//!   returned and whether the actor is still alive.
//! - **Mailbox lifecycle** (`info`): start, shutdown request, final shutdown.
//! - **Mailbox traffic** (`debug`/`trace`): queries, watches, terminations, timeouts,
//!   timer re-arming.
//! - **Overflow** (`warn`): logged once per mailbox, carrying the configured capacity.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo test
//! RUST_LOG=typed_behavior=debug cargo test -- --nocapture
//! RUST_LOG=typed_behavior::mailbox=trace cargo test -- --nocapture
//! ```
//!
//! With `RUST_LOG=debug` a mailbox round trip reads:
//!
//! ```text
//! INFO Mailbox started mailbox=mailbox#3
//! DEBUG receive{timeout=50ms}: Query mailbox=mailbox#3 query=Get { deadline: Instant { .. } }
//! DEBUG Terminated mailbox=mailbox#3 target=worker#7 accepted=true
//! INFO Shutdown mailbox=mailbox#3
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once: if a global subscriber is already set the call does
/// nothing, so every test can start with it.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
