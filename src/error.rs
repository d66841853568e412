//! Error types and error handling strategy for deferred values.
//!
//! Failures travelling through a chain of deferred values are opaque to the
//! engine: any `E: Clone + Debug + From<Error>` can be a failure value. The
//! engine only ever *creates* failures for conditions it detects itself, and
//! it creates them as [`Error`] and converts with `E::from`.
//!
//! # Error Categories
//!
//! - **Resolution**: a value resolved with itself (directly or through an
//!   adoption cycle)
//! - **Isolation**: a handler, starter, probe or foreign `then` panicked; the
//!   panic is caught and turned into a settlement failure
//! - **User**: failures created by application code
//! - **Internal**: engine bugs
//!
//! Configuration problems are reported separately as [`BuildError`] because
//! they happen before any deferred value exists.

use core::fmt;

use crate::types::outcome::PanicPayload;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A deferred value was resolved with itself.
    SelfResolution,
    /// User code panicked while the engine was calling it.
    Panicked,
    /// User-provided error.
    User,
    /// Internal engine error (bug).
    Internal,
}

impl ErrorKind {
    /// Returns the error category for this kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::SelfResolution => ErrorCategory::Resolution,
            Self::Panicked => ErrorCategory::Isolation,
            Self::User => ErrorCategory::User,
            Self::Internal => ErrorCategory::Internal,
        }
    }
}

/// High-level error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Resolution procedure failures.
    Resolution,
    /// Failures converted from panics in user code.
    Isolation,
    /// User-originated errors.
    User,
    /// Internal engine errors.
    Internal,
}

/// The default failure type carried by deferred values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
}

impl Error {
    /// Fixed diagnostic for self-resolution.
    pub const SELF_RESOLUTION_MESSAGE: &'static str =
        "a deferred value cannot be resolved with itself";

    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Creates the self-resolution error.
    #[must_use]
    pub fn self_resolution() -> Self {
        Self::new(ErrorKind::SelfResolution).with_message(Self::SELF_RESOLUTION_MESSAGE)
    }

    /// Creates an error from a caught panic.
    #[must_use]
    pub fn panicked(payload: &PanicPayload) -> Self {
        Self::new(ErrorKind::Panicked).with_message(payload.message())
    }

    /// Creates a user error with a message.
    #[must_use]
    pub fn user(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::User).with_message(msg)
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns true if this is the self-resolution error.
    #[must_use]
    pub const fn is_self_resolution(&self) -> bool {
        matches!(self.kind, ErrorKind::SelfResolution)
    }

    /// Returns true if this error was converted from a panic.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self.kind, ErrorKind::Panicked)
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// A specialized Result type for engine operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error produced while assembling a runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {var}: expected {expected}, got {value:?}")]
    InvalidEnv {
        /// Name of the offending variable.
        var: &'static str,
        /// Description of the accepted values.
        expected: &'static str,
        /// The raw value found in the environment.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_resolution_has_fixed_message() {
        let err = Error::self_resolution();
        assert!(err.is_self_resolution());
        assert_eq!(err.message(), Some(Error::SELF_RESOLUTION_MESSAGE));
        assert_eq!(err.category(), ErrorCategory::Resolution);
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = Error::user("boom");
        assert_eq!(err.to_string(), "User: boom");
        assert_eq!(Error::new(ErrorKind::Internal).to_string(), "Internal");
    }

    #[test]
    fn panicked_carries_payload_message() {
        let err = Error::panicked(&PanicPayload::new("handler exploded"));
        assert!(err.is_panic());
        assert_eq!(err.message(), Some("handler exploded"));
        assert_eq!(err.kind().category(), ErrorCategory::Isolation);
    }

    #[test]
    fn build_error_display() {
        let err = BuildError::InvalidEnv {
            var: "X",
            expected: "bool",
            value: "maybe".into(),
        };
        assert_eq!(err.to_string(), "invalid value for X: expected bool, got \"maybe\"");
    }
}
