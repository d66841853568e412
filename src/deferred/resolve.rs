//! The resolution procedure, settlement and waiter fan-out.

use super::continuation::{self, Waiter};
use super::{guard, isolate, Deferred, State, Waiters};
use crate::error::Error;
use crate::tracing_compat::{debug, trace, warn};
use crate::types::{Capability, Failure, Resolution, Step, ThenHandle, Value};

impl<T: Value, E: Failure> Deferred<T, E> {
    /// Returns the deepest value of this adoption chain.
    ///
    /// Every link walked is re-pointed at the result, so later walks take a
    /// single step.
    pub(crate) fn root(&self) -> Self {
        let mut current = self.clone();
        loop {
            let next = match &current.node.core.borrow().state {
                State::Adopted(next) => next.clone(),
                _ => break,
            };
            current = next;
        }

        let mut link = self.clone();
        while !link.ptr_eq(&current) {
            let next = {
                let mut core = link.node.core.borrow_mut();
                match &mut core.state {
                    State::Adopted(next) if !next.ptr_eq(&current) => {
                        Some(std::mem::replace(next, current.clone()))
                    }
                    _ => None,
                }
            };
            match next {
                Some(next) => link = next,
                None => break,
            }
        }
        current
    }

    /// Runs the resolution procedure with `resolution`.
    pub(crate) fn resolve(&self, resolution: Resolution<T, E>) {
        match resolution {
            Resolution::Value(value) => self.fulfill_now(value),
            Resolution::Deferred(other) => self.adopt(&other),
            Resolution::Thenable(thenable) => {
                let capability = match isolate(|| thenable.probe()) {
                    Ok(capability) => capability,
                    Err(failure) => Capability::ProbeFailed(failure),
                };
                match capability {
                    Capability::NotCapable(value) => self.fulfill_now(value),
                    Capability::ProbeFailed(failure) => {
                        debug!(deferred = %self.id(), "thenable probe failed");
                        self.reject(failure);
                    }
                    Capability::Capable(ThenHandle::Own(other)) => self.adopt(&other),
                    Capability::Capable(ThenHandle::Foreign(then)) => {
                        trace!(deferred = %self.id(), "invoking foreign then");
                        guard::run_guarded(self, then);
                    }
                }
            }
        }
    }

    /// Settles from a handler result.
    pub(crate) fn complete(&self, step: Step<T, E>) {
        match step {
            Ok(resolution) => self.resolve(resolution),
            Err(failure) => self.reject(failure),
        }
    }

    /// Follows `other` from now on.
    ///
    /// Adopting a value whose chain ends at this value would make it wait on
    /// itself forever, so that is rejected as self-resolution.
    fn adopt(&self, other: &Self) {
        let root = other.root();
        if root.ptr_eq(self) {
            warn!(deferred = %self.id(), "self-resolution rejected");
            self.reject(E::from(Error::self_resolution()));
            return;
        }
        let target = root.id();
        if let Some(waiters) = self.transition(State::Adopted(root)) {
            trace!(deferred = %self.id(), target = %target, "adopted");
            self.finalize(waiters);
        }
    }

    fn fulfill_now(&self, value: T) {
        if let Some(waiters) = self.transition(State::Fulfilled(value)) {
            trace!(deferred = %self.id(), waiters = waiters.len(), "fulfilled");
            self.finalize(waiters);
        }
    }

    pub(crate) fn reject(&self, failure: E) {
        if let Some(waiters) = self.transition(State::Rejected(failure.clone())) {
            trace!(deferred = %self.id(), waiters = waiters.len(), "rejected");
            self.node.runtime.rejected(self.id(), &failure);
            self.finalize(waiters);
        }
    }

    fn transition(&self, next: State<T, E>) -> Option<Waiters<T, E>> {
        let mut core = self.node.core.borrow_mut();
        if !matches!(core.state, State::Pending) {
            warn!(deferred = %self.id(), "settlement of a non-pending value ignored");
            return None;
        }
        core.state = next;
        Some(std::mem::take(&mut core.waiters))
    }

    /// Hands every queued waiter to this value again, in registration order.
    fn finalize(&self, waiters: Waiters<T, E>) {
        for waiter in waiters {
            self.handle(waiter);
        }
    }

    /// Queues `waiter` on the root of this value, or schedules it if the
    /// root is already settled.
    pub(crate) fn handle(&self, waiter: Box<dyn Waiter<T, E>>) {
        let root = self.root();
        root.node.runtime.attached(root.id());
        let outcome = {
            let mut core = root.node.core.borrow_mut();
            match core.outcome() {
                Some(outcome) => outcome,
                None => {
                    core.waiters.push(waiter);
                    return;
                }
            }
        };
        continuation::dispatch(&root.node.runtime, outcome, waiter);
    }
}
