//! Pre-built settled values for primitive literals.
//!
//! `resolve_value(true)` and friends hand back one shared, already-fulfilled
//! value per runtime instead of allocating a new one each time. A settled
//! value never changes and every attach creates a fresh downstream value, so
//! sharing is invisible to settlement outcome and timing.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::deferred::Deferred;
use crate::runtime::state::RuntimeState;
use crate::types::{Failure, Value};

/// Literal values that get a shared settled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Literal {
    True,
    False,
    Unit,
    Zero,
    EmptyText,
}

macro_rules! zero_of {
    ($value:expr; $($ty:ty),*) => {
        $(
            if let Some(n) = $value.downcast_ref::<$ty>() {
                return (*n == 0).then_some(Self::Zero);
            }
        )*
    };
}

impl Literal {
    pub(crate) fn classify(value: &dyn Any) -> Option<Self> {
        if let Some(b) = value.downcast_ref::<bool>() {
            return Some(if *b { Self::True } else { Self::False });
        }
        if value.is::<()>() {
            return Some(Self::Unit);
        }
        zero_of!(value; i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
        // Positive zero only: -0.0 must not come back as 0.0.
        if let Some(n) = value.downcast_ref::<f64>() {
            return (n.to_bits() == 0).then_some(Self::Zero);
        }
        if let Some(n) = value.downcast_ref::<f32>() {
            return (n.to_bits() == 0).then_some(Self::Zero);
        }
        if let Some(s) = value.downcast_ref::<String>() {
            return s.is_empty().then_some(Self::EmptyText);
        }
        if let Some(s) = value.downcast_ref::<&'static str>() {
            return s.is_empty().then_some(Self::EmptyText);
        }
        None
    }
}

type Key = (TypeId, TypeId, Literal);

#[derive(Default)]
pub(crate) struct LiteralCache {
    entries: RefCell<HashMap<Key, Box<dyn Any>>>,
}

impl LiteralCache {
    /// Returns a fulfilled value, shared when `value` is a cached literal.
    pub(crate) fn fulfilled<T: Value, E: Failure>(
        &self,
        state: &Rc<RuntimeState>,
        value: T,
    ) -> Deferred<T, E> {
        let Some(literal) = Literal::classify(&value) else {
            return Deferred::fulfilled(state, value);
        };
        let key = (TypeId::of::<T>(), TypeId::of::<E>(), literal);
        let cached = self
            .entries
            .borrow()
            .get(&key)
            .and_then(|entry| entry.downcast_ref::<Deferred<T, E>>())
            .cloned();
        if let Some(deferred) = cached {
            return deferred;
        }
        let deferred = Deferred::fulfilled(state, value);
        self.entries
            .borrow_mut()
            .insert(key, Box::new(deferred.clone()));
        deferred
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}
