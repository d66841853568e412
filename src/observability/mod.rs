//! Diagnostics built on the runtime hooks.
//!
//! The engine itself only reports through `tracing` and the two optional
//! [`Hooks`](crate::runtime::Hooks). This module provides tooling layered on
//! top of those hooks:
//!
//! - [`rejection`]: track rejections and flag the ones nobody handled

pub mod rejection;

pub use rejection::{RejectionRecord, RejectionTracker};
