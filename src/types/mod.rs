//! Core types shared by the engine.
//!
//! - [`id`]: identifiers for deferred values
//! - [`outcome`]: the settled outcome and caught panic payloads
//! - [`resolution`]: what a deferred value can be resolved with, and the
//!   then-capability probe for foreign objects

pub mod id;
pub mod outcome;
pub mod resolution;

pub use id::DeferredId;
pub use outcome::{Outcome, PanicPayload};
pub use resolution::{
    Capability, Failure, FnThenable, OnFailure, OnSuccess, Resolution, Step, ThenFn, ThenHandle,
    Thenable, Value,
};
