//! Combinators over deferred values.
//!
//! This module provides the free-standing constructors and aggregators:
//!
//! - [`wrap`]: Lift a plain value, deferred value or thenable, or a failure
//! - [`all`]: Wait for every element (`all_of`, `all_settled`)
//! - [`race`]: Settle with the first element to settle
//!
//! Every input element is normalized through the resolution procedure, so
//! sequences may freely mix plain values, deferred values and thenables.

pub mod all;
pub mod race;
pub mod wrap;

pub use all::{all_of, all_settled};
pub use race::first_settled;
pub use wrap::{reject_with, resolve_value};
