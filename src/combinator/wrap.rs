//! Lifting values into deferred values.

use crate::deferred::Deferred;
use crate::runtime::Runtime;
use crate::types::{Failure, Resolution, Value};

/// Wraps `value` as a deferred value.
///
/// - A plain value yields an already-fulfilled value. Primitive literals
///   (`true`, `false`, `()`, zero, empty text) may share one pre-built value
///   per runtime.
/// - One of our own deferred values is returned unchanged.
/// - A thenable yields a new value that adopts it through the resolution
///   procedure; probing happens now.
pub fn resolve_value<T: Value, E: Failure>(
    runtime: &Runtime,
    value: Resolution<T, E>,
) -> Deferred<T, E> {
    match value {
        Resolution::Value(value) => runtime.literal_fulfilled(value),
        other => Deferred::from_resolution(runtime.state(), other),
    }
}

/// Returns a new value already rejected with `failure`.
pub fn reject_with<T: Value, E: Failure>(runtime: &Runtime, failure: E) -> Deferred<T, E> {
    Deferred::rejected(runtime.state(), failure)
}
