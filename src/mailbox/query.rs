//! Waiting queries and what they receive.

use std::fmt;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::behavior::context::ActorId;
use crate::mailbox::error::MailboxError;

/// What a query is answered with. Termination notifications stay distinguishable
/// from ordinary messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<M> {
    Message(M),
    Terminated(ActorId),
}

impl<M> Delivery<M> {
    pub fn message(&self) -> Option<&M> {
        match self {
            Delivery::Message(msg) => Some(msg),
            Delivery::Terminated(_) => None,
        }
    }

    pub fn into_message(self) -> Option<M> {
        match self {
            Delivery::Message(msg) => Some(msg),
            Delivery::Terminated(_) => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Delivery::Terminated(_))
    }
}

/// Channel back to the asking caller.
pub type Reply<M> = oneshot::Sender<Result<Delivery<M>, MailboxError>>;

/// Acceptance test of a selective query.
pub type Predicate<M> = Box<dyn Fn(&Delivery<M>) -> bool + Send>;

/// A request for one delivery, answered by its deadline or failed with a timeout.
pub enum Query<M> {
    /// Accepts the next delivery, whatever it is.
    Get { deadline: Instant, reply: Reply<M> },
    /// Accepts the first delivery the predicate matches.
    Select {
        deadline: Instant,
        predicate: Predicate<M>,
        reply: Reply<M>,
    },
}

impl<M> Query<M> {
    pub fn get(deadline: Instant, reply: Reply<M>) -> Self {
        Query::Get { deadline, reply }
    }

    pub fn select(
        deadline: Instant,
        predicate: impl Fn(&Delivery<M>) -> bool + Send + 'static,
        reply: Reply<M>,
    ) -> Self {
        Query::Select {
            deadline,
            predicate: Box::new(predicate),
            reply,
        }
    }

    pub fn deadline(&self) -> Instant {
        match self {
            Query::Get { deadline, .. } | Query::Select { deadline, .. } => *deadline,
        }
    }

    /// A `Get` accepts anything; a `Select` accepts what its predicate matches.
    pub fn accepts(&self, delivery: &Delivery<M>) -> bool {
        match self {
            Query::Get { .. } => true,
            Query::Select { predicate, .. } => predicate(delivery),
        }
    }

    /// Answers the caller. Hands the delivery back if the caller stopped waiting.
    pub(crate) fn answer(self, delivery: Delivery<M>) -> Result<(), Delivery<M>> {
        let reply = match self {
            Query::Get { reply, .. } | Query::Select { reply, .. } => reply,
        };
        reply.send(Ok(delivery)).map_err(|unsent| match unsent {
            Ok(delivery) => delivery,
            Err(_) => unreachable!("an answer is always Ok"),
        })
    }

    pub(crate) fn fail(self, error: MailboxError) {
        let reply = match self {
            Query::Get { reply, .. } | Query::Select { reply, .. } => reply,
        };
        let _ = reply.send(Err(error));
    }
}

impl<M> fmt::Debug for Query<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Query::Get { .. } => "Get",
            Query::Select { .. } => "Select",
        };
        f.debug_struct(kind).field("deadline", &self.deadline()).finish()
    }
}
