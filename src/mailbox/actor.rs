//! # Deadline Mailbox Actor
//!
//! [`DeadlineMailbox`] is the server half: it owns a [`MailboxState`] and the receiving end
//! of the command channel, and processes commands one at a time. Because the state is
//! only touched from this loop, it needs no locking.
//!
//! The channel is unbounded because [`ActorRef::tell`](crate::behavior::context::ActorRef::tell)
//! is synchronous. The configured capacity bounds the buffered deliveries instead.
//!
//! Deadline kicks come back through the same channel. The timer task only holds a weak
//! sender, so dropping every client still ends the loop.

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::behavior::context::ActorId;
use crate::mailbox::client::MailboxClient;
use crate::mailbox::config::MailboxConfig;
use crate::mailbox::error::MailboxError;
use crate::mailbox::query::{Delivery, Query};
use crate::mailbox::state::MailboxState;
use crate::mailbox::timer::TokioScheduler;

// =============================================================================
// 1. COMMANDS
// =============================================================================

/// Internal message type sent to the mailbox loop.
#[derive(Debug)]
pub(crate) enum Command<M> {
    Query(Query<M>),
    Deliver(M),
    Watch(ActorId),
    Unwatch(ActorId),
    Terminated(ActorId),
    Kick,
    Shutdown,
}

// =============================================================================
// 2. THE SERVER
// =============================================================================

pub struct DeadlineMailbox<M> {
    id: ActorId,
    receiver: mpsc::UnboundedReceiver<Command<M>>,
    state: MailboxState<M, TokioScheduler>,
}

impl<M: Send + 'static> DeadlineMailbox<M> {
    pub fn new(config: MailboxConfig) -> (Self, MailboxClient<M>) {
        Self::named("mailbox", config)
    }

    pub fn named(name: &str, config: MailboxConfig) -> (Self, MailboxClient<M>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let weak = sender.downgrade();
        let scheduler = TokioScheduler::new(move || {
            if let Some(sender) = weak.upgrade() {
                let _ = sender.send(Command::Kick);
            }
        });
        let id = ActorId::fresh(name);
        let mailbox = Self {
            id: id.clone(),
            receiver,
            state: MailboxState::new(config.capacity, scheduler),
        };
        let client = MailboxClient::new(id, sender, config.default_timeout());
        (mailbox, client)
    }

    /// Creates the mailbox and runs it on the current tokio runtime.
    pub fn spawn(config: MailboxConfig) -> MailboxClient<M> {
        let (mailbox, client) = Self::new(config);
        tokio::spawn(mailbox.run());
        client
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Runs the command loop until `Shutdown` arrives or every client is dropped.
    pub async fn run(mut self) {
        info!(mailbox = %self.id, "Mailbox started");

        while let Some(command) = self.receiver.recv().await {
            match command {
                Command::Query(query) => {
                    debug!(mailbox = %self.id, ?query, "Query");
                    self.state.on_query(query);
                }
                Command::Deliver(msg) => self.state.on_delivery(Delivery::Message(msg)),
                Command::Watch(target) => {
                    debug!(mailbox = %self.id, %target, "Watch");
                    self.state.watch(target);
                }
                Command::Unwatch(target) => self.state.unwatch(&target),
                Command::Terminated(target) => {
                    let accepted = self.state.on_terminated(target.clone());
                    debug!(mailbox = %self.id, %target, accepted, "Terminated");
                }
                Command::Kick => self.state.on_kick(Instant::now()),
                Command::Shutdown => {
                    info!(mailbox = %self.id, "Shutdown requested");
                    break;
                }
            }
        }

        self.receiver.close();
        while let Ok(command) = self.receiver.try_recv() {
            if let Command::Query(query) = command {
                query.fail(MailboxError::Closed);
            }
        }
        self.state.shutdown();
        info!(mailbox = %self.id, "Shutdown");
    }
}
