//! Continuation records.
//!
//! A waiter sits on a pending value until it settles, then runs on a later
//! scheduler turn with a copy of the outcome.

use std::rc::Rc;

use super::teardown::Link;
use super::{isolate, Deferred};
use crate::runtime::state::RuntimeState;
use crate::types::{DeferredId, Failure, OnFailure, OnSuccess, Outcome, Resolution, Step, Value};

pub(crate) trait Waiter<T, E> {
    fn run(self: Box<Self>, outcome: Outcome<T, E>);

    /// Gives up the value this waiter would have settled, without running it.
    fn into_downstream(self: Box<Self>) -> Option<Box<dyn Link>>;
}

pub(super) enum SuccessArm<T, U, E> {
    /// No handler: pass the value through.
    Forward(fn(T) -> U),
    Handle(OnSuccess<T, U, E>),
}

/// Handlers attached with `then`, feeding a downstream value.
pub(super) struct Continuation<T, U, E> {
    on_success: SuccessArm<T, U, E>,
    on_failure: Option<OnFailure<U, E>>,
    downstream: Deferred<U, E>,
}

impl<T, U, E> Continuation<T, U, E> {
    pub(super) fn new(
        on_success: SuccessArm<T, U, E>,
        on_failure: Option<OnFailure<U, E>>,
        downstream: Deferred<U, E>,
    ) -> Self {
        Self {
            on_success,
            on_failure,
            downstream,
        }
    }
}

impl<T: Value, U: Value, E: Failure> Waiter<T, E> for Continuation<T, U, E> {
    fn run(self: Box<Self>, outcome: Outcome<T, E>) {
        let Self {
            on_success,
            on_failure,
            downstream,
        } = *self;
        let step = match outcome {
            Outcome::Fulfilled(value) => match on_success {
                SuccessArm::Forward(forward) => Ok(Resolution::Value(forward(value))),
                SuccessArm::Handle(handler) => invoke(move || handler(value)),
            },
            Outcome::Rejected(failure) => match on_failure {
                Some(handler) => invoke(move || handler(failure)),
                None => Err(failure),
            },
        };
        downstream.complete(step);
    }

    fn into_downstream(self: Box<Self>) -> Option<Box<dyn Link>> {
        Some(Box::new(self.downstream))
    }
}

fn invoke<U, E: Failure>(handler: impl FnOnce() -> Step<U, E>) -> Step<U, E> {
    isolate(handler).and_then(|step| step)
}

/// End of a terminated chain; a failure arriving here is unhandled.
pub(super) struct TerminalSink {
    runtime: Rc<RuntimeState>,
    source: DeferredId,
}

impl TerminalSink {
    pub(super) fn new(runtime: Rc<RuntimeState>, source: DeferredId) -> Self {
        Self { runtime, source }
    }
}

impl<T: Value, E: Failure> Waiter<T, E> for TerminalSink {
    fn run(self: Box<Self>, outcome: Outcome<T, E>) {
        if let Outcome::Rejected(failure) = outcome {
            let Self { runtime, source } = *self;
            let raiser = Rc::clone(&runtime);
            runtime.schedule(Box::new(move || raiser.raise_unhandled(source, &failure)));
        }
    }

    fn into_downstream(self: Box<Self>) -> Option<Box<dyn Link>> {
        None
    }
}

/// Schedules `waiter` to run with `outcome` on a later turn.
pub(super) fn dispatch<T: Value, E: Failure>(
    runtime: &RuntimeState,
    outcome: Outcome<T, E>,
    waiter: Box<dyn Waiter<T, E>>,
) {
    runtime.schedule(Box::new(move || waiter.run(outcome)));
}
