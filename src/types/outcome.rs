//! Two-valued settled outcome of a deferred value.
//!
//! - `Fulfilled(T)`: settled with a success value
//! - `Rejected(E)`: settled with a failure value
//!
//! A pending value has no outcome; every `Outcome` is terminal.

use core::fmt;
use std::any::Any;

/// Payload from a caught panic.
///
/// User code called by the engine (starters, handlers, probes, foreign `then`
/// functions) runs under panic isolation; the payload message is kept so the
/// panic can travel down a chain as an ordinary failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicPayload {
    message: String,
}

impl PanicPayload {
    /// Creates a new panic payload with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Extracts the message from a payload returned by `catch_unwind`.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(s) = payload.downcast_ref::<&str>() {
            Self::new(*s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            Self::new(s.clone())
        } else {
            Self::new("unknown panic")
        }
    }

    /// Returns the panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic: {}", self.message)
    }
}

/// The settled outcome of a deferred value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// Settled with a success value.
    Fulfilled(T),
    /// Settled with a failure value.
    Rejected(E),
}

impl<T, E> Outcome<T, E> {
    /// Returns true if this outcome is `Fulfilled`.
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// Returns true if this outcome is `Rejected`.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Returns the success value, if any.
    pub fn fulfilled(self) -> Option<T> {
        match self {
            Self::Fulfilled(v) => Some(v),
            Self::Rejected(_) => None,
        }
    }

    /// Returns the failure value, if any.
    pub fn rejected(self) -> Option<E> {
        match self {
            Self::Fulfilled(_) => None,
            Self::Rejected(e) => Some(e),
        }
    }

    /// Converts this outcome to a standard Result.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Fulfilled(v) => Ok(v),
            Self::Rejected(e) => Err(e),
        }
    }

    /// Borrows the contents of this outcome.
    pub const fn as_ref(&self) -> Outcome<&T, &E> {
        match self {
            Self::Fulfilled(v) => Outcome::Fulfilled(v),
            Self::Rejected(e) => Outcome::Rejected(e),
        }
    }

    /// Maps the success value using the provided function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U, E> {
        match self {
            Self::Fulfilled(v) => Outcome::Fulfilled(f(v)),
            Self::Rejected(e) => Outcome::Rejected(e),
        }
    }

    /// Maps the failure value using the provided function.
    pub fn map_err<F2, G: FnOnce(E) -> F2>(self, g: G) -> Outcome<T, F2> {
        match self {
            Self::Fulfilled(v) => Outcome::Fulfilled(v),
            Self::Rejected(e) => Outcome::Rejected(g(e)),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Fulfilled(v),
            Err(e) => Self::Rejected(e),
        }
    }
}
