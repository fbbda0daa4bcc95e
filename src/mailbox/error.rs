//! Error types for the deadline mailbox.

use thiserror::Error;

/// Outcomes a waiting caller can receive instead of a delivery.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MailboxError {
    /// The query's deadline passed before a matching delivery arrived.
    #[error("Deadline passed")]
    Timeout,

    /// The mailbox loop has shut down.
    #[error("Mailbox closed")]
    Closed,

    /// The mailbox dropped the reply channel without answering.
    #[error("Mailbox dropped response channel")]
    Dropped,
}
