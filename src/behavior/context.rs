//! # Host Interface
//!
//! Behaviors never hold a live reference to their host. Every dispatch receives the
//! execution context explicitly as `&mut dyn ActorContext`, so a behavior value stays
//! relocatable between calls.
//!
//! The host runtime implements [`ActorContext`]; the crate ships one implementation for
//! tests in [`crate::testkit::EffectfulContext`].

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::behavior::core::Behavior;

/// Type-erased message handed to the host for scheduled delivery.
pub type AnyMessage = Box<dyn Any + Send>;

/// Identity of an actor, independent of the message type it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorId {
    uid: u64,
    name: Arc<str>,
}

impl ActorId {
    pub fn new(uid: u64, name: impl Into<Arc<str>>) -> Self {
        Self {
            uid,
            name: name.into(),
        }
    }

    /// An identity with a process-unique uid.
    pub fn fresh(name: impl Into<Arc<str>>) -> Self {
        static NEXT_UID: AtomicU64 = AtomicU64::new(1);
        Self::new(NEXT_UID.fetch_add(1, Ordering::Relaxed), name)
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.uid)
    }
}

/// Typed handle through which messages of type `M` reach an actor or inbox.
pub struct ActorRef<M> {
    id: ActorId,
    sink: Arc<dyn Fn(M) + Send + Sync>,
}

impl<M: 'static> ActorRef<M> {
    pub fn new(id: ActorId, sink: impl Fn(M) + Send + Sync + 'static) -> Self {
        Self {
            id,
            sink: Arc::new(sink),
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Fire-and-forget delivery.
    pub fn tell(&self, msg: M) {
        (self.sink)(msg)
    }

    /// A reference accepting a narrower message type that converts into `M`.
    pub fn narrow<N>(&self) -> ActorRef<N>
    where
        N: Into<M> + 'static,
    {
        let sink = self.sink.clone();
        ActorRef::new(self.id.clone(), move |msg: N| sink(msg.into()))
    }
}

impl<M> Clone for ActorRef<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl<M> fmt::Debug for ActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActorRef").field(&self.id).finish()
    }
}

/// Behavior description passed to [`ActorContext::spawn`]. The host recovers the
/// typed behavior with [`Props::into_behavior`].
pub struct Props {
    behavior: Box<dyn Any + Send>,
    message_type: &'static str,
}

impl Props {
    pub fn new<M: 'static>(behavior: Behavior<M>) -> Self {
        Self {
            behavior: Box::new(behavior),
            message_type: std::any::type_name::<M>(),
        }
    }

    pub fn message_type(&self) -> &'static str {
        self.message_type
    }

    /// Recovers the behavior, or gives the props back if `M` is the wrong type.
    pub fn into_behavior<M: 'static>(self) -> Result<Behavior<M>, Props> {
        let message_type = self.message_type;
        self.behavior
            .downcast::<Behavior<M>>()
            .map(|b| *b)
            .map_err(|behavior| Props {
                behavior,
                message_type,
            })
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("message_type", &self.message_type)
            .finish()
    }
}

/// Handle returned by the host scheduler. Cancelling is idempotent.
#[derive(Clone)]
pub struct Cancellable {
    cancelled: Arc<AtomicBool>,
    on_cancel: Arc<Mutex<Option<Box<dyn FnOnce() + Send>>>>,
}

impl Cancellable {
    pub fn new(on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            on_cancel: Arc::new(Mutex::new(Some(Box::new(on_cancel)))),
        }
    }

    /// A handle with nothing to cancel besides its own flag.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        let hook = self
            .on_cancel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(hook) = hook {
            hook();
        }
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Cancellable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancellable")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Errors surfaced by host operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// A live child already uses the requested name.
    #[error("Child name already taken: {0}")]
    NameTaken(String),

    /// The identity is not a child of this actor.
    #[error("Not a child of this actor: {0}")]
    UnknownChild(ActorId),
}

/// Execution context a host passes to every dispatch.
///
/// All operations are synchronous requests to the host; their effects (spawning,
/// stopping, scheduling) happen outside the current dispatch.
pub trait ActorContext {
    /// Identity of the actor being dispatched into.
    fn self_id(&self) -> &ActorId;

    /// Live children, in spawn order.
    fn children(&self) -> Vec<ActorId>;

    fn child(&self, name: &str) -> Option<ActorId>;

    /// Spawns a child. Fails if `name` collides with a live child.
    fn spawn(&mut self, props: Props, name: Option<&str>) -> Result<ActorId, ContextError>;

    fn stop(&mut self, child: &ActorId) -> Result<(), ContextError>;

    /// Idempotent death-watch registration.
    fn watch(&mut self, target: &ActorId);

    fn unwatch(&mut self, target: &ActorId);

    /// Delivers `message` to `target` after `delay`.
    fn schedule_once(&mut self, delay: Duration, target: &ActorId, message: AnyMessage) -> Cancellable;

    /// `None` disables the receive timeout.
    fn set_receive_timeout(&mut self, timeout: Option<Duration>);
}
