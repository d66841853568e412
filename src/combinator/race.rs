//! First-to-settle combinator.
//!
//! `first_settled(items)` settles, either way, like whichever element settles
//! first. Later settlements hit the result's once-only guard and are
//! dropped; the losing elements are not cancelled.
//!
//! Elements are normalized in input order and each one is observed through a
//! continuation, so when several elements are already settled the earliest
//! in input order wins. An empty sequence never settles.

use crate::deferred::Deferred;
use crate::runtime::Runtime;
use crate::tracing_compat::trace;
use crate::types::{Failure, Resolution, Value};

/// Settles with the outcome of the first element to settle.
pub fn first_settled<T: Value, E: Failure>(
    runtime: &Runtime,
    items: Vec<Resolution<T, E>>,
) -> Deferred<T, E> {
    Deferred::new(runtime, move |resolve, reject| {
        trace!(elements = items.len(), "first_settled started");
        for item in items {
            let element = Deferred::from_resolution(runtime.state(), item);
            let resolve = resolve.clone();
            let reject = reject.clone();
            let _sink: Deferred<(), E> = element.then_or_else(
                move |value| {
                    resolve.fulfill(value);
                    Ok(Resolution::Value(()))
                },
                move |failure| {
                    reject.reject(failure);
                    Ok(Resolution::Value(()))
                },
            );
        }
        Ok(())
    })
}
