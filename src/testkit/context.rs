//! # Effect-Recording Context
//!
//! [`EffectfulContext`] implements [`ActorContext`] without a runtime. Spawned children
//! are kept as inert [`Props`]; every request a behavior makes is appended to an effect
//! log that tests read back with [`EffectfulContext::take_effects`].

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use crate::behavior::context::{ActorContext, ActorId, AnyMessage, Cancellable, ContextError, Props};

/// A request a behavior made to its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Spawned { child: ActorId, message_type: &'static str },
    Stopped(ActorId),
    Watched(ActorId),
    Unwatched(ActorId),
    Scheduled { delay: Duration, target: ActorId },
    ReceiveTimeoutSet(Option<Duration>),
}

/// A message handed to [`ActorContext::schedule_once`], kept for inspection.
pub struct ScheduledMessage {
    pub delay: Duration,
    pub target: ActorId,
    pub message: AnyMessage,
    pub handle: Cancellable,
}

impl ScheduledMessage {
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.message.downcast_ref::<T>()
    }
}

struct Child {
    id: ActorId,
    props: Option<Props>,
}

pub struct EffectfulContext {
    self_id: ActorId,
    children: Vec<Child>,
    anonymous: u64,
    watching: HashSet<ActorId>,
    effects: Vec<Effect>,
    scheduled: Vec<ScheduledMessage>,
    receive_timeout: Option<Duration>,
}

impl EffectfulContext {
    pub fn new(name: &str) -> Self {
        Self::with_id(ActorId::fresh(name))
    }

    pub fn with_id(self_id: ActorId) -> Self {
        Self {
            self_id,
            children: Vec::new(),
            anonymous: 0,
            watching: HashSet::new(),
            effects: Vec::new(),
            scheduled: Vec::new(),
            receive_timeout: None,
        }
    }

    /// Drains the effect log.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn take_scheduled(&mut self) -> Vec<ScheduledMessage> {
        std::mem::take(&mut self.scheduled)
    }

    pub fn is_watching(&self, target: &ActorId) -> bool {
        self.watching.contains(target)
    }

    pub fn receive_timeout(&self) -> Option<Duration> {
        self.receive_timeout
    }

    /// Takes the props a child was spawned with. `None` if the child is unknown or its
    /// props were already taken.
    pub fn take_child_props(&mut self, child: &ActorId) -> Option<Props> {
        self.children
            .iter_mut()
            .find(|c| &c.id == child)
            .and_then(|c| c.props.take())
    }
}

impl ActorContext for EffectfulContext {
    fn self_id(&self) -> &ActorId {
        &self.self_id
    }

    fn children(&self) -> Vec<ActorId> {
        self.children.iter().map(|c| c.id.clone()).collect()
    }

    fn child(&self, name: &str) -> Option<ActorId> {
        self.children
            .iter()
            .find(|c| c.id.name() == name)
            .map(|c| c.id.clone())
    }

    fn spawn(&mut self, props: Props, name: Option<&str>) -> Result<ActorId, ContextError> {
        let name = match name {
            Some(name) => {
                if self.child(name).is_some() {
                    return Err(ContextError::NameTaken(name.to_string()));
                }
                name.to_string()
            }
            None => {
                self.anonymous += 1;
                format!("$anon{}", self.anonymous)
            }
        };
        let id = ActorId::fresh(name);
        debug!(parent = %self.self_id, child = %id, message_type = props.message_type(), "Spawn");
        self.effects.push(Effect::Spawned {
            child: id.clone(),
            message_type: props.message_type(),
        });
        self.children.push(Child {
            id: id.clone(),
            props: Some(props),
        });
        Ok(id)
    }

    fn stop(&mut self, child: &ActorId) -> Result<(), ContextError> {
        let index = self
            .children
            .iter()
            .position(|c| &c.id == child)
            .ok_or_else(|| ContextError::UnknownChild(child.clone()))?;
        self.children.remove(index);
        self.effects.push(Effect::Stopped(child.clone()));
        Ok(())
    }

    fn watch(&mut self, target: &ActorId) {
        if self.watching.insert(target.clone()) {
            self.effects.push(Effect::Watched(target.clone()));
        }
    }

    fn unwatch(&mut self, target: &ActorId) {
        if self.watching.remove(target) {
            self.effects.push(Effect::Unwatched(target.clone()));
        }
    }

    fn schedule_once(&mut self, delay: Duration, target: &ActorId, message: AnyMessage) -> Cancellable {
        let handle = Cancellable::noop();
        self.effects.push(Effect::Scheduled {
            delay,
            target: target.clone(),
        });
        self.scheduled.push(ScheduledMessage {
            delay,
            target: target.clone(),
            message,
            handle: handle.clone(),
        });
        handle
    }

    fn set_receive_timeout(&mut self, timeout: Option<Duration>) {
        self.receive_timeout = timeout;
        self.effects.push(Effect::ReceiveTimeoutSet(timeout));
    }
}
