//! Resolver and rejecter handles.
//!
//! Both handles of one pair share a single guard: the first call to either
//! claims it, and every later call is ignored. A fresh pair is created for
//! every starter and every foreign `then` invocation.

use core::fmt;
use std::cell::Cell;
use std::rc::Rc;

use super::{isolate, Deferred};
use crate::tracing_compat::{debug, trace};
use crate::types::{Failure, Resolution, Value};

#[derive(Clone, Default)]
struct OnceGuard(Rc<Cell<bool>>);

impl OnceGuard {
    /// Returns true for the first caller only.
    fn claim(&self) -> bool {
        !self.0.replace(true)
    }

    fn is_claimed(&self) -> bool {
        self.0.get()
    }
}

/// Settles a deferred value with a success value or another value to adopt.
pub struct Resolver<T, E> {
    target: Deferred<T, E>,
    guard: OnceGuard,
}

/// Settles a deferred value with a failure.
pub struct Rejecter<T, E> {
    target: Deferred<T, E>,
    guard: OnceGuard,
}

pub(crate) fn pair<T, E>(target: &Deferred<T, E>) -> (Resolver<T, E>, Rejecter<T, E>) {
    let guard = OnceGuard::default();
    (
        Resolver {
            target: target.clone(),
            guard: guard.clone(),
        },
        Rejecter {
            target: target.clone(),
            guard,
        },
    )
}

impl<T: Value, E: Failure> Resolver<T, E> {
    /// Resolves the target. Ignored if this pair already fired.
    pub fn resolve(&self, resolution: Resolution<T, E>) {
        if self.guard.claim() {
            self.target.resolve(resolution);
        } else {
            trace!(deferred = %self.target.id(), "late resolve ignored");
        }
    }

    /// Fulfills the target with a plain value.
    pub fn fulfill(&self, value: T) {
        self.resolve(Resolution::Value(value));
    }

    /// Makes the target follow `other`.
    pub fn adopt(&self, other: &Deferred<T, E>) {
        self.resolve(Resolution::Deferred(other.clone()));
    }

    /// Returns true once either handle of this pair has fired.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.guard.is_claimed()
    }
}

impl<T: Value, E: Failure> Rejecter<T, E> {
    /// Rejects the target. Ignored if this pair already fired.
    pub fn reject(&self, failure: E) {
        if self.guard.claim() {
            self.target.reject(failure);
        } else {
            trace!(deferred = %self.target.id(), "late reject ignored");
        }
    }

    /// Returns true once either handle of this pair has fired.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.guard.is_claimed()
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<T, E> Clone for Rejecter<T, E> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("target", &self.target.id())
            .field("done", &self.guard.is_claimed())
            .finish()
    }
}

impl<T, E> fmt::Debug for Rejecter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejecter")
            .field("target", &self.target.id())
            .field("done", &self.guard.is_claimed())
            .finish()
    }
}

/// Runs `starter` with a fresh guarded pair for `target`.
///
/// A failure returned or panicked by `starter` rejects `target` unless the
/// pair already fired, in which case it is dropped.
pub(crate) fn run_guarded<T, E, F>(target: &Deferred<T, E>, starter: F)
where
    T: Value,
    E: Failure,
    F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>,
{
    let (resolver, rejecter) = pair(target);
    let guard = resolver.guard.clone();
    let failure = match isolate(move || starter(resolver, rejecter)) {
        Ok(Ok(())) => return,
        Ok(Err(failure)) | Err(failure) => failure,
    };
    if guard.claim() {
        target.reject(failure);
    } else {
        debug!(
            deferred = %target.id(),
            failure = ?failure,
            "failure raised after settlement ignored"
        );
    }
}
