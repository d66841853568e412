//! State shared by every deferred value of one runtime.
//!
//! Each deferred value keeps an `Rc` to this state: it needs the scheduler to
//! dispatch continuations, the hooks to report attaches and rejections, and
//! the id allocator. The literal singleton cache lives on the
//! [`Runtime`](super::Runtime) handle: cached values hold this state, so it
//! must not hold them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::runtime::config::{Hooks, RuntimeConfig, UnhandledFailure, UnhandledPolicy};
use crate::runtime::scheduler::{Schedule, Task, TurnQueue};
use crate::tracing_compat::error;
use crate::types::DeferredId;

pub(crate) struct RuntimeState {
    scheduler: Rc<dyn Schedule>,
    hooks: Hooks,
    unhandled_policy: UnhandledPolicy,
    next_id: Cell<u64>,
    unhandled: RefCell<Vec<UnhandledFailure>>,
}

impl RuntimeState {
    pub(crate) fn new(config: &RuntimeConfig) -> Self {
        let scheduler = config
            .scheduler
            .clone()
            .unwrap_or_else(|| Rc::new(TurnQueue::new()));
        Self {
            scheduler,
            hooks: config.hooks.clone(),
            unhandled_policy: config.unhandled,
            next_id: Cell::new(1),
            unhandled: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn next_id(&self) -> DeferredId {
        let raw = self.next_id.get();
        self.next_id.set(raw + 1);
        DeferredId::from_raw(raw)
    }

    pub(crate) fn scheduler(&self) -> &Rc<dyn Schedule> {
        &self.scheduler
    }

    pub(crate) fn schedule(&self, task: Task) {
        self.scheduler.schedule(task);
    }

    pub(crate) fn attached(&self, id: DeferredId) {
        self.hooks.attached(id);
    }

    pub(crate) fn rejected(&self, id: DeferredId, failure: &dyn fmt::Debug) {
        self.hooks.rejected(id, failure);
    }

    /// Surfaces a failure that fell off the end of a terminal chain.
    pub(crate) fn raise_unhandled(&self, deferred: DeferredId, failure: &dyn fmt::Debug) {
        let message = format!("{failure:?}");
        error!(deferred = %deferred, failure = %message, "unhandled failure");
        match self.unhandled_policy {
            UnhandledPolicy::Record => self
                .unhandled
                .borrow_mut()
                .push(UnhandledFailure { deferred, message }),
            UnhandledPolicy::Panic => panic!("unhandled failure on {deferred}: {message}"),
        }
    }

    pub(crate) fn take_unhandled(&self) -> Vec<UnhandledFailure> {
        std::mem::take(&mut *self.unhandled.borrow_mut())
    }
}

impl fmt::Debug for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeState")
            .field("queued", &self.scheduler.queued())
            .field("next_id", &self.next_id.get())
            .field("unhandled_policy", &self.unhandled_policy)
            .field("unhandled", &self.unhandled.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let state = RuntimeState::new(&RuntimeConfig::default());
        assert_eq!(state.next_id(), DeferredId::from_raw(1));
        assert_eq!(state.next_id(), DeferredId::from_raw(2));
    }

    #[test]
    fn record_policy_keeps_failures() {
        let state = RuntimeState::new(&RuntimeConfig::default());
        state.raise_unhandled(DeferredId::from_raw(7), &"lost");
        let taken = state.take_unhandled();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].deferred, DeferredId::from_raw(7));
        assert_eq!(taken[0].message, "\"lost\"");
        assert!(state.take_unhandled().is_empty());
    }

    #[test]
    #[should_panic(expected = "unhandled failure on D3")]
    fn panic_policy_panics() {
        let config = RuntimeConfig {
            unhandled: UnhandledPolicy::Panic,
            ..RuntimeConfig::default()
        };
        RuntimeState::new(&config).raise_unhandled(DeferredId::from_raw(3), &"boom");
    }
}
