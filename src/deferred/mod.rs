//! The deferred value.
//!
//! A [`Deferred`] stands for the eventual outcome of an operation that has
//! not completed. Consumers attach continuations; producers settle the value
//! exactly once through a [`Resolver`] / [`Rejecter`] pair.
//!
//! # State Machine
//!
//! ```text
//!             resolve(value)               reject(failure)
//!   Pending ─────────────────► Fulfilled   Pending ─────────► Rejected
//!      │
//!      │ resolve(deferred)
//!      ▼
//!   Adopted ──► (outcome of the adopted value)
//! ```
//!
//! Once a value leaves `Pending` it never changes again. `Adopted` is
//! internal: every operation on an adopted value is forwarded to the deepest
//! non-adopted value of the chain. Adoption stores the deepest value known at
//! that point, and every walk re-points the links it passes, so chains
//! collapse as they are used. Dropping a chain is iterative too.
//!
//! # Asynchrony
//!
//! Continuations run on a later turn of the runtime's scheduler, never inside
//! the call that attached them or the call that settled their source, even
//! when the source is already settled at attach time.
//!
//! ```
//! use asupersync_deferred::{Deferred, Error, Runtime};
//!
//! let runtime = Runtime::new();
//! let (value, resolver, _rejecter) = Deferred::<i32, Error>::pending(&runtime);
//! let doubled = value.map(|v| v * 2);
//!
//! resolver.fulfill(21);
//! assert!(doubled.is_pending());
//!
//! runtime.run_until_idle();
//! assert_eq!(doubled.value(), Some(42));
//! ```

mod continuation;
mod guard;
mod resolve;
mod teardown;

use core::fmt;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::Error;
use crate::runtime::state::RuntimeState;
use crate::runtime::Runtime;
use crate::tracing_compat::warn;
use crate::types::{
    DeferredId, Failure, OnFailure, OnSuccess, Outcome, PanicPayload, Resolution, Step, Value,
};

use continuation::{Continuation, SuccessArm, TerminalSink};
pub(crate) use continuation::Waiter;
pub use guard::{Rejecter, Resolver};

type Waiters<T, E> = SmallVec<[Box<dyn Waiter<T, E>>; 1]>;

pub(crate) enum State<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
    Adopted(Deferred<T, E>),
}

struct Core<T, E> {
    state: State<T, E>,
    waiters: Waiters<T, E>,
}

impl<T: Clone, E: Clone> Core<T, E> {
    fn outcome(&self) -> Option<Outcome<T, E>> {
        match &self.state {
            State::Fulfilled(v) => Some(Outcome::Fulfilled(v.clone())),
            State::Rejected(e) => Some(Outcome::Rejected(e.clone())),
            State::Pending | State::Adopted(_) => None,
        }
    }
}

struct Node<T, E> {
    id: DeferredId,
    runtime: Rc<RuntimeState>,
    core: RefCell<Core<T, E>>,
}

/// Observable state of a deferred value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredState {
    /// Not settled yet (or adopted a value that is not settled yet).
    Pending,
    /// Settled with a success value.
    Fulfilled,
    /// Settled with a failure value.
    Rejected,
}

impl fmt::Display for DeferredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Fulfilled => f.write_str("fulfilled"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// A value that will be available later.
///
/// `Deferred` is a cheap, clonable handle; clones refer to the same value.
pub struct Deferred<T, E = Error> {
    node: Rc<Node<T, E>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T, E> Deferred<T, E> {
    /// Returns this value's id.
    #[must_use]
    pub fn id(&self) -> DeferredId {
        self.node.id
    }

    /// Returns true if both handles refer to the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    fn with_state(runtime: &Rc<RuntimeState>, state: State<T, E>) -> Self {
        Self {
            node: Rc::new(Node {
                id: runtime.next_id(),
                runtime: Rc::clone(runtime),
                core: RefCell::new(Core {
                    state,
                    waiters: SmallVec::new(),
                }),
            }),
        }
    }
}

impl<T: Value, E: Failure> Deferred<T, E> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Creates a deferred value and runs `starter` synchronously.
    ///
    /// `starter` receives a resolver and a rejecter; only the first call to
    /// either has any effect. If `starter` returns `Err` (or panics) before
    /// either was called, the value is rejected with that failure.
    pub fn new<F>(runtime: &Runtime, starter: F) -> Self
    where
        F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>,
    {
        let deferred = Self::detached(runtime.state());
        guard::run_guarded(&deferred, starter);
        deferred
    }

    /// Creates a pending value and hands back its resolver and rejecter.
    #[must_use]
    pub fn pending(runtime: &Runtime) -> (Self, Resolver<T, E>, Rejecter<T, E>) {
        let deferred = Self::detached(runtime.state());
        let (resolver, rejecter) = guard::pair(&deferred);
        (deferred, resolver, rejecter)
    }

    pub(crate) fn detached(runtime: &Rc<RuntimeState>) -> Self {
        Self::with_state(runtime, State::Pending)
    }

    pub(crate) fn fulfilled(runtime: &Rc<RuntimeState>, value: T) -> Self {
        Self::with_state(runtime, State::Fulfilled(value))
    }

    pub(crate) fn rejected(runtime: &Rc<RuntimeState>, failure: E) -> Self {
        let deferred = Self::detached(runtime);
        deferred.reject(failure);
        deferred
    }

    /// Normalizes a resolution into a deferred value, returning own values
    /// unchanged.
    pub(crate) fn from_resolution(runtime: &Rc<RuntimeState>, resolution: Resolution<T, E>) -> Self {
        match resolution {
            Resolution::Deferred(deferred) => deferred,
            Resolution::Value(value) => Self::fulfilled(runtime, value),
            thenable @ Resolution::Thenable(_) => {
                let deferred = Self::detached(runtime);
                deferred.resolve(thenable);
                deferred
            }
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Returns the current state, looking through adoption.
    #[must_use]
    pub fn state(&self) -> DeferredState {
        let root = self.root();
        let core = root.node.core.borrow();
        match core.state {
            State::Fulfilled(_) => DeferredState::Fulfilled,
            State::Rejected(_) => DeferredState::Rejected,
            State::Pending | State::Adopted(_) => DeferredState::Pending,
        }
    }

    /// Returns true while no outcome is known.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == DeferredState::Pending
    }

    /// Returns true once fulfilled.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.state() == DeferredState::Fulfilled
    }

    /// Returns true once rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.state() == DeferredState::Rejected
    }

    /// Returns a copy of the outcome, if settled.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome<T, E>> {
        let root = self.root();
        let core = root.node.core.borrow();
        core.outcome()
    }

    /// Returns a copy of the success value, if fulfilled.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        self.outcome().and_then(Outcome::fulfilled)
    }

    /// Returns a copy of the failure value, if rejected.
    #[must_use]
    pub fn reason(&self) -> Option<E> {
        self.outcome().and_then(Outcome::rejected)
    }

    // ------------------------------------------------------------------
    // Continuations
    // ------------------------------------------------------------------

    /// Attaches optional handlers and returns the value fed by them.
    ///
    /// An absent handler passes the corresponding outcome through unchanged.
    /// A handler's `Ok` resolves the returned value (adopting any deferred
    /// value or thenable it carries); its `Err` or panic rejects it.
    pub fn attach(
        &self,
        on_success: Option<OnSuccess<T, T, E>>,
        on_failure: Option<OnFailure<T, E>>,
    ) -> Self {
        let on_success = match on_success {
            Some(handler) => SuccessArm::Handle(handler),
            None => SuccessArm::Forward(std::convert::identity),
        };
        self.chain(on_success, on_failure)
    }

    /// Attaches a success handler that may change the value type.
    pub fn then<U, F>(&self, on_success: F) -> Deferred<U, E>
    where
        U: Value,
        F: FnOnce(T) -> Step<U, E> + 'static,
    {
        self.chain(SuccessArm::Handle(Box::new(on_success)), None)
    }

    /// Attaches both handlers, producing a value of a possibly new type.
    pub fn then_or_else<U, F, R>(&self, on_success: F, on_failure: R) -> Deferred<U, E>
    where
        U: Value,
        F: FnOnce(T) -> Step<U, E> + 'static,
        R: FnOnce(E) -> Step<U, E> + 'static,
    {
        self.chain(
            SuccessArm::Handle(Box::new(on_success)),
            Some(Box::new(on_failure)),
        )
    }

    /// Maps the success value with an infallible function.
    pub fn map<U, F>(&self, f: F) -> Deferred<U, E>
    where
        U: Value,
        F: FnOnce(T) -> U + 'static,
    {
        self.then(move |value| Ok(Resolution::Value(f(value))))
    }

    /// Attaches a failure handler; success passes through.
    pub fn catch_failure<R>(&self, on_failure: R) -> Self
    where
        R: FnOnce(E) -> Step<T, E> + 'static,
    {
        self.attach(None, Some(Box::new(on_failure)))
    }

    /// Runs `cleanup` on either outcome, then re-propagates the original
    /// outcome.
    ///
    /// If `cleanup` fails, or resolves to a value that rejects, that failure
    /// replaces the original outcome.
    pub fn finally<C>(&self, cleanup: C) -> Self
    where
        C: FnOnce() -> Step<(), E> + 'static,
    {
        let slot = Rc::new(RefCell::new(Some(cleanup)));
        let failure_slot = Rc::clone(&slot);
        let runtime = Rc::clone(&self.node.runtime);
        let failure_runtime = Rc::clone(&runtime);
        self.attach(
            Some(Box::new(move |value: T| {
                let gate = run_cleanup(&runtime, &slot)?;
                Ok(Resolution::Deferred(
                    gate.then(move |()| Ok(Resolution::Value(value))),
                ))
            })),
            Some(Box::new(move |failure: E| {
                let gate = run_cleanup(&failure_runtime, &failure_slot)?;
                Ok(Resolution::Deferred(gate.then(move |()| Err(failure))))
            })),
        )
    }

    /// Terminates a chain.
    ///
    /// Behaves like [`attach`](Self::attach) when handlers are given, but the
    /// result is not another deferred value: a failure reaching the end,
    /// including one raised by the handlers, is surfaced on a later turn as
    /// an unhandled failure (see [`UnhandledPolicy`]).
    ///
    /// [`UnhandledPolicy`]: crate::runtime::UnhandledPolicy
    pub fn on_terminal(
        &self,
        on_success: Option<OnSuccess<T, T, E>>,
        on_failure: Option<OnFailure<T, E>>,
    ) {
        let tail = if on_success.is_none() && on_failure.is_none() {
            self.clone()
        } else {
            self.attach(on_success, on_failure)
        };
        let sink = TerminalSink::new(Rc::clone(&tail.node.runtime), tail.id());
        tail.handle(Box::new(sink));
    }

    fn chain<U: Value>(
        &self,
        on_success: SuccessArm<T, U, E>,
        on_failure: Option<OnFailure<U, E>>,
    ) -> Deferred<U, E> {
        let downstream = Deferred::detached(&self.node.runtime);
        self.handle(Box::new(Continuation::new(
            on_success,
            on_failure,
            downstream.clone(),
        )));
        downstream
    }
}

/// Runs user code, turning a panic into a failure value.
fn isolate<R, E: Failure>(f: impl FnOnce() -> R) -> Result<R, E> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let payload = PanicPayload::from_panic(&*payload);
        warn!(panic = %payload, "panic caught in user code");
        E::from(Error::panicked(&payload))
    })
}

fn run_cleanup<E, C>(
    runtime: &Rc<RuntimeState>,
    slot: &RefCell<Option<C>>,
) -> Result<Deferred<(), E>, E>
where
    E: Failure,
    C: FnOnce() -> Step<(), E>,
{
    let cleanup = slot.borrow_mut().take();
    let resolution = match cleanup {
        Some(cleanup) => cleanup()?,
        None => Resolution::Value(()),
    };
    Ok(Deferred::from_resolution(runtime, resolution))
}

impl<T: Value, E: Failure> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}
