//! # Mailbox Client
//!
//! [`MailboxClient`] is the cloneable handle to a running
//! [`DeadlineMailbox`](crate::mailbox::DeadlineMailbox). Every call is a command on the
//! mailbox channel; queries wait on a oneshot reply.
//!
//! [`Queries`] layers timeout-relative receiving on top of any type that can reach a
//! mailbox, the same way a typed client would wrap a raw one.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::behavior::context::{ActorId, ActorRef};
use crate::mailbox::actor::Command;
use crate::mailbox::error::MailboxError;
use crate::mailbox::query::{Delivery, Query};

pub struct MailboxClient<M> {
    id: ActorId,
    sender: mpsc::UnboundedSender<Command<M>>,
    default_timeout: Duration,
}

impl<M> Clone for MailboxClient<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            sender: self.sender.clone(),
            default_timeout: self.default_timeout,
        }
    }
}

impl<M: Send + 'static> MailboxClient<M> {
    pub(crate) fn new(id: ActorId, sender: mpsc::UnboundedSender<Command<M>>, default_timeout: Duration) -> Self {
        Self {
            id,
            sender,
            default_timeout,
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// A typed reference delivering into this mailbox. Sends after shutdown are dropped.
    pub fn actor_ref(&self) -> ActorRef<M> {
        let sender = self.sender.clone();
        ActorRef::new(self.id.clone(), move |msg| {
            let _ = sender.send(Command::Deliver(msg));
        })
    }

    pub fn send(&self, msg: M) -> Result<(), MailboxError> {
        self.command(Command::Deliver(msg))
    }

    /// Waits for the next delivery, failing with `Timeout` once `deadline` passes.
    pub async fn submit_get(&self, deadline: Instant) -> Result<Delivery<M>, MailboxError> {
        let (reply, response) = oneshot::channel();
        self.command(Command::Query(Query::get(deadline, reply)))?;
        response.await.map_err(|_| MailboxError::Dropped)?
    }

    /// Waits for the first delivery `predicate` accepts. Rejected deliveries stay buffered.
    pub async fn submit_select<P>(&self, deadline: Instant, predicate: P) -> Result<Delivery<M>, MailboxError>
    where
        P: Fn(&Delivery<M>) -> bool + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        self.command(Command::Query(Query::select(deadline, predicate, reply)))?;
        response.await.map_err(|_| MailboxError::Dropped)?
    }

    /// Accepts one future termination notification for `target`.
    pub fn watch_target(&self, target: &ActorId) -> Result<(), MailboxError> {
        self.command(Command::Watch(target.clone()))
    }

    pub fn unwatch_target(&self, target: &ActorId) -> Result<(), MailboxError> {
        self.command(Command::Unwatch(target.clone()))
    }

    /// Reports that `target` terminated. Ignored unless the target is watched.
    pub fn notify_terminated(&self, target: &ActorId) -> Result<(), MailboxError> {
        self.command(Command::Terminated(target.clone()))
    }

    pub fn shutdown(&self) -> Result<(), MailboxError> {
        self.command(Command::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn command(&self, command: Command<M>) -> Result<(), MailboxError> {
        self.sender.send(command).map_err(|_| MailboxError::Closed)
    }
}

/// Receiving with relative timeouts.
///
/// # Provided Methods
/// Implementors only supply [`Queries::mailbox`]; everything else is derived from it.
#[async_trait]
pub trait Queries<M: Send + 'static>: Send + Sync {
    fn mailbox(&self) -> &MailboxClient<M>;

    #[tracing::instrument(skip(self))]
    async fn receive(&self, timeout: Duration) -> Result<Delivery<M>, MailboxError> {
        self.mailbox().submit_get(Instant::now() + timeout).await
    }

    async fn receive_default(&self) -> Result<Delivery<M>, MailboxError> {
        let timeout = self.mailbox().default_timeout();
        self.receive(timeout).await
    }

    /// Like [`Queries::receive`], yielding `None` when the delivery is a termination.
    async fn receive_message(&self, timeout: Duration) -> Result<Option<M>, MailboxError> {
        Ok(self.receive(timeout).await?.into_message())
    }

    #[tracing::instrument(skip(self, predicate))]
    async fn select<P>(&self, timeout: Duration, predicate: P) -> Result<Delivery<M>, MailboxError>
    where
        P: Fn(&Delivery<M>) -> bool + Send + 'static,
    {
        self.mailbox().submit_select(Instant::now() + timeout, predicate).await
    }
}

impl<M: Send + 'static> Queries<M> for MailboxClient<M> {
    fn mailbox(&self) -> &MailboxClient<M> {
        self
    }
}
