//! Wait-for-all combinators.
//!
//! # Semantics
//!
//! `all_of(items)`:
//! 1. Normalize every element (plain value, deferred value or thenable)
//! 2. Store each success in the slot matching its input position
//! 3. Fulfill with the full sequence once the last slot is filled
//! 4. Reject with the first failure observed
//!
//! A rejection does not stop the other elements; they keep settling in the
//! background and their results are dropped. Elements that are already
//! settled are observed synchronously, without waiting for a turn.
//!
//! `all_settled(items)` collects an [`Outcome`] per element and never
//! rejects.

use std::cell::RefCell;
use std::rc::Rc;

use crate::deferred::{Deferred, Rejecter, Resolver};
use crate::runtime::Runtime;
use crate::tracing_compat::trace;
use crate::types::{Failure, Outcome, Resolution, Value};

/// Result slots shared by the element sinks.
struct Gather<S> {
    slots: Vec<Option<S>>,
    remaining: usize,
}

impl<S> Gather<S> {
    fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
            remaining: len,
        }
    }

    /// Fills slot `index`; returns every slot once none is left empty.
    fn store(&mut self, index: usize, value: S) -> Option<Vec<S>> {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.replace(value).is_none() {
                self.remaining -= 1;
            }
        }
        if self.remaining == 0 {
            Some(self.slots.drain(..).flatten().collect())
        } else {
            None
        }
    }
}

type Shared<S> = Rc<RefCell<Gather<S>>>;

fn store<S: Value, E: Failure>(
    gather: &Shared<S>,
    resolver: &Resolver<Vec<S>, E>,
    index: usize,
    value: S,
) {
    let complete = gather.borrow_mut().store(index, value);
    if let Some(values) = complete {
        resolver.fulfill(values);
    }
}

/// Fulfills with every element's success value, in input order.
///
/// Empty input fulfills immediately with an empty vector. The first failure
/// observed rejects the result; remaining elements are not cancelled.
pub fn all_of<T: Value, E: Failure>(
    runtime: &Runtime,
    items: Vec<Resolution<T, E>>,
) -> Deferred<Vec<T>, E> {
    Deferred::new(runtime, move |resolve, reject| {
        trace!(elements = items.len(), "all_of started");
        if items.is_empty() {
            resolve.fulfill(Vec::new());
            return Ok(());
        }
        let gather: Shared<T> = Rc::new(RefCell::new(Gather::new(items.len())));
        for (index, item) in items.into_iter().enumerate() {
            let element = match item {
                Resolution::Value(value) => {
                    store(&gather, &resolve, index, value);
                    continue;
                }
                other => Deferred::from_resolution(runtime.state(), other),
            };
            match element.outcome() {
                Some(Outcome::Fulfilled(value)) => {
                    store(&gather, &resolve, index, value);
                    continue;
                }
                Some(Outcome::Rejected(failure)) => reject.reject(failure),
                None => {}
            }
            watch(&element, &gather, &resolve, &reject, index);
        }
        Ok(())
    })
}

fn watch<T: Value, E: Failure>(
    element: &Deferred<T, E>,
    gather: &Shared<T>,
    resolve: &Resolver<Vec<T>, E>,
    reject: &Rejecter<Vec<T>, E>,
    index: usize,
) {
    let gather = Rc::clone(gather);
    let resolve = resolve.clone();
    let reject = reject.clone();
    let _sink: Deferred<(), E> = element.then_or_else(
        move |value| {
            store(&gather, &resolve, index, value);
            Ok(Resolution::Value(()))
        },
        move |failure| {
            reject.reject(failure);
            Ok(Resolution::Value(()))
        },
    );
}

/// Fulfills with every element's outcome, in input order, once all settle.
///
/// Never rejects; empty input fulfills immediately with an empty vector.
pub fn all_settled<T: Value, E: Failure>(
    runtime: &Runtime,
    items: Vec<Resolution<T, E>>,
) -> Deferred<Vec<Outcome<T, E>>, E> {
    Deferred::new(runtime, move |resolve, _reject| {
        trace!(elements = items.len(), "all_settled started");
        if items.is_empty() {
            resolve.fulfill(Vec::new());
            return Ok(());
        }
        let gather: Shared<Outcome<T, E>> = Rc::new(RefCell::new(Gather::new(items.len())));
        for (index, item) in items.into_iter().enumerate() {
            let element = match item {
                Resolution::Value(value) => {
                    store(&gather, &resolve, index, Outcome::Fulfilled(value));
                    continue;
                }
                other => Deferred::from_resolution(runtime.state(), other),
            };
            if let Some(outcome) = element.outcome() {
                store(&gather, &resolve, index, outcome);
                continue;
            }
            let on_value = (Rc::clone(&gather), resolve.clone());
            let on_failure = (Rc::clone(&gather), resolve.clone());
            let _sink: Deferred<(), E> = element.then_or_else(
                move |value| {
                    store(&on_value.0, &on_value.1, index, Outcome::Fulfilled(value));
                    Ok(Resolution::Value(()))
                },
                move |failure| {
                    store(&on_failure.0, &on_failure.1, index, Outcome::Rejected(failure));
                    Ok(Resolution::Value(()))
                },
            );
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn gather_fills_in_any_order() {
        let mut gather = Gather::new(3);
        assert_eq!(gather.store(2, 'c'), None);
        assert_eq!(gather.store(0, 'a'), None);
        assert_eq!(gather.store(1, 'b'), Some(vec!['a', 'b', 'c']));
    }

    #[test]
    fn gather_ignores_repeated_slots() {
        let mut gather = Gather::new(2);
        assert_eq!(gather.store(0, 1), None);
        assert_eq!(gather.store(0, 2), None);
        assert_eq!(gather.store(1, 3), Some(vec![2, 3]));
    }

    #[test]
    fn plain_values_fulfill_synchronously() {
        let rt = Runtime::new();
        let all: Deferred<Vec<i32>, Error> =
            all_of(&rt, vec![Resolution::Value(1), Resolution::Value(2)]);
        assert_eq!(all.value(), Some(vec![1, 2]));
    }

    #[test]
    fn pending_elements_are_awaited_in_position() {
        let rt = Runtime::new();
        let (first, resolve_first, _) = Deferred::<i32, Error>::pending(&rt);
        let (second, resolve_second, _) = Deferred::<i32, Error>::pending(&rt);
        let all = all_of(
            &rt,
            vec![first.into(), Resolution::Value(5), second.into()],
        );
        resolve_second.fulfill(9);
        rt.run_until_idle();
        assert!(all.is_pending());
        resolve_first.fulfill(1);
        rt.run_until_idle();
        assert_eq!(all.value(), Some(vec![1, 5, 9]));
    }

    #[test]
    fn settled_outcomes_are_collected() {
        let rt = Runtime::new();
        let failed: Deferred<i32, Error> = rt.reject_with(Error::user("x"));
        let settled = all_settled(&rt, vec![Resolution::Value(1), failed.into()]);
        assert_eq!(
            settled.value(),
            Some(vec![Outcome::Fulfilled(1), Outcome::Rejected(Error::user("x"))])
        );
    }
}
