//! Runtime state and turn scheduling.
//!
//! - [`config`]: Runtime configuration types and diagnostic hooks
//! - [`builder`]: Runtime builder and handles
//! - [`env_config`]: Environment variable overrides
//! - [`scheduler`]: The scheduling collaborator seam and the FIFO turn queue
//!
//! # Runtime Builder
//!
//! The runtime is configured with a fluent, move-based builder API:
//!
//! ```
//! use asupersync_deferred::runtime::{RuntimeBuilder, UnhandledPolicy};
//!
//! let runtime = RuntimeBuilder::new()
//!     .max_turns(10_000)
//!     .unhandled_policy(UnhandledPolicy::Record)
//!     .build();
//! assert!(runtime.is_idle());
//! ```
//!
//! A runtime is single-threaded: deferred values hold `Rc`s into it and are
//! neither `Send` nor `Sync`. Nothing runs until the owner drives the queue
//! with [`Runtime::run_turn`] or [`Runtime::run_until_idle`].

pub mod builder;
pub mod config;
pub mod env_config;
pub(crate) mod literals;
pub mod scheduler;
pub(crate) mod state;

pub use builder::{Runtime, RuntimeBuilder};
pub use config::{
    AttachHook, Hooks, RejectHook, RuntimeConfig, UnhandledFailure, UnhandledPolicy,
};
pub use scheduler::{Schedule, Task, TurnQueue};
