//! What a deferred value can be resolved with.
//!
//! Resolvers and handlers hand the engine a [`Resolution`]: a plain value, one
//! of our own deferred values, or a foreign [`Thenable`]. Foreign objects are
//! never inspected directly; the engine asks them once, through
//! [`Thenable::probe`], whether they carry a then-capability.

use core::fmt;
use std::rc::Rc;

use crate::deferred::{Deferred, Rejecter, Resolver};
use crate::error::Error;

/// Bound for success values carried by deferred values.
///
/// Values are cloned when a settled value fans out to several continuations.
pub trait Value: Clone + 'static {}

impl<T: Clone + 'static> Value for T {}

/// Bound for failure values carried by deferred values.
///
/// `From<Error>` lets the engine inject its own failures (self-resolution,
/// caught panics) into a chain with an application failure type.
pub trait Failure: Clone + fmt::Debug + From<Error> + 'static {}

impl<E: Clone + fmt::Debug + From<Error> + 'static> Failure for E {}

/// Result of a handler: `Ok` resolves the downstream value, `Err` rejects it.
pub type Step<T, E> = Result<Resolution<T, E>, E>;

/// Boxed success handler, as stored in a continuation record.
pub type OnSuccess<T, U, E> = Box<dyn FnOnce(T) -> Step<U, E>>;

/// Boxed failure handler, as stored in a continuation record.
pub type OnFailure<U, E> = Box<dyn FnOnce(E) -> Step<U, E>>;

/// A callable then-capability of a foreign object.
///
/// It receives a guarded resolver/rejecter pair; returning `Err` (or
/// panicking) before either of them fires rejects the adopting value.
pub type ThenFn<T, E> = Box<dyn FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>>;

/// Something a deferred value can be resolved with.
pub enum Resolution<T, E> {
    /// A plain value; fulfills immediately.
    Value(T),
    /// One of our own deferred values; adopted without probing.
    Deferred(Deferred<T, E>),
    /// An object that may carry a then-capability.
    Thenable(Rc<dyn Thenable<T, E>>),
}

impl<T, E> Resolution<T, E> {
    /// Wraps a foreign thenable.
    pub fn thenable(thenable: impl Thenable<T, E> + 'static) -> Self {
        Self::Thenable(Rc::new(thenable))
    }
}

impl<T, E> From<Deferred<T, E>> for Resolution<T, E> {
    fn from(deferred: Deferred<T, E>) -> Self {
        Self::Deferred(deferred)
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Deferred(d) => f.debug_tuple("Deferred").field(&d.id()).finish(),
            Self::Thenable(_) => f.write_str("Thenable(..)"),
        }
    }
}

/// Outcome of probing an object for a then-capability.
pub enum Capability<T, E> {
    /// The object has no callable `then`; it is a plain value after all.
    NotCapable(T),
    /// The object has a callable `then`.
    Capable(ThenHandle<T, E>),
    /// Reading the capability failed.
    ProbeFailed(E),
}

/// A then-capability found by a probe.
pub enum ThenHandle<T, E> {
    /// The capability is our own attach function on one of our own values.
    Own(Deferred<T, E>),
    /// A foreign `then` function.
    Foreign(ThenFn<T, E>),
}

/// An object that may expose a then-capability.
///
/// `probe` is called at most once per resolution; implementations that run
/// arbitrary code to answer may fail, and that failure is reported as
/// [`Capability::ProbeFailed`] (a panic is treated the same way).
pub trait Thenable<T, E> {
    /// Reads the then-capability of this object.
    fn probe(&self) -> Capability<T, E>;
}

impl<T: Value, E: Failure> Thenable<T, E> for Deferred<T, E> {
    fn probe(&self) -> Capability<T, E> {
        Capability::Capable(ThenHandle::Own(self.clone()))
    }
}

/// A thenable built from a closure that is invoked as its `then` function.
///
/// Handy for bridging callback-style producers into a chain. The closure may
/// be invoked once per adoption.
pub struct FnThenable<F> {
    then: Rc<F>,
}

impl<F> FnThenable<F> {
    /// Wraps a `then` function.
    pub fn new(then: F) -> Self {
        Self { then: Rc::new(then) }
    }
}

impl<T, E, F> Thenable<T, E> for FnThenable<F>
where
    F: Fn(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E> + 'static,
{
    fn probe(&self) -> Capability<T, E> {
        let then = Rc::clone(&self.then);
        Capability::Capable(ThenHandle::Foreign(Box::new(move |resolve, reject| {
            then(resolve, reject)
        })))
    }
}
