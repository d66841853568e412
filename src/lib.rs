//! Asupersync Deferred: single-assignment deferred values with chained continuations.
//!
//! # Overview
//!
//! A [`Deferred`] is a container for a result that is not known yet. Producers
//! settle it exactly once, with a success value or a failure; consumers attach
//! continuations that run on a later turn of a cooperative, single-threaded
//! [`Runtime`] and feed new deferred values, forming chains.
//!
//! # Core Guarantees
//!
//! - **Single assignment**: Once settled, a value never changes; later attempts are ignored
//! - **Asynchronous continuations**: Handlers never run inside the call that attached them or the call that settled their source
//! - **Adoption**: Resolving with another deferred value or a thenable makes the target follow it
//! - **Failure propagation**: A missing handler passes the outcome through unchanged; a handler that fails or panics rejects its downstream value
//! - **Deterministic scheduling**: Turns run in FIFO order, one at a time, when the owner drives the runtime
//!
//! # Module Structure
//!
//! - [`deferred`]: The deferred value, its resolver and rejecter
//! - [`types`]: Identifiers, outcomes, and resolution/thenable types
//! - [`runtime`]: Scheduler seam, configuration, builder and runtime handle
//! - [`combinator`]: `resolve_value`, `reject_with`, `all_of`, `all_settled`, `first_settled`
//! - [`observability`]: Rejection tracking built on the diagnostic hooks
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```
//! use asupersync_deferred::{Deferred, Error, Resolution, Runtime};
//!
//! let runtime = Runtime::new();
//! let answer: Deferred<i32> = runtime.deferred(|resolve, _reject| {
//!     resolve.fulfill(20);
//!     Ok(())
//! });
//! let total = answer
//!     .then(|v| Ok(Resolution::Value(v + 1)))
//!     .map(|v| v * 2);
//!
//! runtime.run_until_idle();
//! assert_eq!(total.value(), Some(42));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod combinator;
pub mod deferred;
pub mod error;
pub mod observability;
pub mod runtime;
pub mod tracing_compat;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-exports for convenient access to core types
pub use deferred::{Deferred, DeferredState, Rejecter, Resolver};
pub use error::{BuildError, Error, ErrorCategory, ErrorKind, Result};
pub use observability::RejectionTracker;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, UnhandledPolicy};
pub use types::{
    Capability, DeferredId, Failure, FnThenable, Outcome, PanicPayload, Resolution, Step,
    ThenHandle, Thenable, Value,
};
