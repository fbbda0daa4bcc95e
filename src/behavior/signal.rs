//! # Signals & Supervision Decisions
//!
//! Signals are lifecycle notifications that a host delivers reliably, in contrast to
//! ordinary messages which are delivered at most once.
//!
//! A [`Signal::ChildFailed`] carries a [`DecisionSlot`]. The parent's signal handler
//! registers its supervisory [`Decision`] there before returning; if nothing is
//! registered the host reads back [`Decision::Escalate`].

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::behavior::context::ActorId;

/// Failure cause attached to restart and child-failure signals.
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// Supervisory response to a failed child.
///
/// Variants are declared in ascending precedence so the derived `Ord` gives
/// `Resume < Restart < Stop < Escalate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Decision {
    Resume,
    Restart,
    Stop,
    Escalate,
}

impl Decision {
    /// Picks the higher-precedence of two decisions.
    pub fn resolve(self, other: Decision) -> Decision {
        self.max(other)
    }
}

/// Shared cell through which a `ChildFailed` handler communicates its decision.
#[derive(Clone, Default)]
pub struct DecisionSlot {
    inner: Arc<Mutex<Option<Decision>>>,
}

impl DecisionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a decision. Repeated registrations keep the highest precedence.
    pub fn decide(&self, decision: Decision) {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(match *slot {
            Some(existing) => existing.resolve(decision),
            None => decision,
        });
    }

    /// The explicitly registered decision, if any.
    pub fn registered(&self) -> Option<Decision> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The effective decision: whatever was registered, `Escalate` otherwise.
    pub fn decision(&self) -> Decision {
        self.registered().unwrap_or(Decision::Escalate)
    }
}

impl fmt::Debug for DecisionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DecisionSlot").field(&self.registered()).finish()
    }
}

/// Closed set of lifecycle and system notifications.
#[derive(Clone)]
pub enum Signal {
    PreStart,
    PreRestart(Cause),
    PostRestart(Cause),
    PostStop,
    ReceiveTimeout,
    ChildFailed {
        child: ActorId,
        cause: Cause,
        decision: DecisionSlot,
    },
    Terminated(ActorId),
}

impl Signal {
    /// Builds a `ChildFailed` signal with an empty decision slot.
    pub fn child_failed(child: ActorId, cause: Cause) -> Self {
        Signal::ChildFailed {
            child,
            cause,
            decision: DecisionSlot::new(),
        }
    }

    /// Copy of this signal whose `ChildFailed` decision slot is fresh and unshared.
    /// Other variants are returned as plain clones.
    pub fn with_fresh_decision(&self) -> Self {
        match self {
            Signal::ChildFailed { child, cause, .. } => Signal::child_failed(child.clone(), cause.clone()),
            other => other.clone(),
        }
    }

    /// The decision slot, for `ChildFailed` only.
    pub fn decision_slot(&self) -> Option<&DecisionSlot> {
        match self {
            Signal::ChildFailed { decision, .. } => Some(decision),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Signal::PreStart => "PreStart",
            Signal::PreRestart(_) => "PreRestart",
            Signal::PostRestart(_) => "PostRestart",
            Signal::PostStop => "PostStop",
            Signal::ReceiveTimeout => "ReceiveTimeout",
            Signal::ChildFailed { .. } => "ChildFailed",
            Signal::Terminated(_) => "Terminated",
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::PreRestart(cause) | Signal::PostRestart(cause) => {
                f.debug_tuple(self.name()).field(&cause.to_string()).finish()
            }
            Signal::ChildFailed {
                child,
                cause,
                decision,
            } => f
                .debug_struct("ChildFailed")
                .field("child", child)
                .field("cause", &cause.to_string())
                .field("decision", decision)
                .finish(),
            Signal::Terminated(id) => f.debug_tuple("Terminated").field(id).finish(),
            _ => f.write_str(self.name()),
        }
    }
}
