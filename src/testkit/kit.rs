//! Synchronous harness running one behavior against an [`EffectfulContext`].

use tracing::debug;

use crate::behavior::cell::{BehaviorCell, DeliveryError};
use crate::behavior::context::{ActorContext, ActorId};
use crate::behavior::core::Behavior;
use crate::behavior::signal::{Cause, Decision, Signal};
use crate::testkit::context::{Effect, EffectfulContext};

pub struct BehaviorTestKit<M> {
    ctx: EffectfulContext,
    cell: BehaviorCell<M>,
}

impl<M: 'static> BehaviorTestKit<M> {
    /// Installs `behavior` and delivers `PreStart`.
    pub fn new(name: &str, behavior: Behavior<M>) -> Self {
        let mut ctx = EffectfulContext::new(name);
        let mut cell = BehaviorCell::new(behavior);
        if cell.start(&mut ctx).is_err() {
            debug!(actor = %ctx.self_id(), "Stopped before PreStart");
        }
        Self { ctx, cell }
    }

    pub fn self_id(&self) -> &ActorId {
        self.ctx.self_id()
    }

    pub fn run(&mut self, msg: M) -> Result<(), DeliveryError> {
        self.cell.deliver_message(&mut self.ctx, &msg)
    }

    pub fn signal(&mut self, signal: Signal) -> Result<(), DeliveryError> {
        self.cell.deliver_signal(&mut self.ctx, &signal)
    }

    pub fn child_failed(&mut self, child: ActorId, cause: Cause) -> Result<Decision, DeliveryError> {
        self.cell.deliver_child_failure(&mut self.ctx, child, cause)
    }

    pub fn stop(&mut self) {
        self.cell.stop(&mut self.ctx);
    }

    pub fn is_alive(&self) -> bool {
        self.cell.is_alive()
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.ctx.take_effects()
    }

    pub fn ctx(&self) -> &EffectfulContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut EffectfulContext {
        &mut self.ctx
    }
}
