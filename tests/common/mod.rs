#![allow(dead_code)]
#![allow(unused_imports)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! mod common;
//! use common::*;
//! ```

use asupersync_deferred::runtime::{Runtime, RuntimeBuilder, UnhandledPolicy};
use asupersync_deferred::{Deferred, Error, Outcome, Resolution};
use proptest::prelude::ProptestConfig;
use proptest::test_runner::RngSeed;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Default seed for property tests when running under CI.
pub const DEFAULT_PROPTEST_SEED: u64 = 0x5EED5EED;

const PROPTEST_SEED_ENV: &str = "ASUPERSYNC_PROPTEST_SEED";
const PROPTEST_MAX_SHRINK_ITERS_ENV: &str = "ASUPERSYNC_PROPTEST_MAX_SHRINK_ITERS";

/// Configuration for property tests with optional deterministic seed support.
#[derive(Debug, Clone)]
pub struct PropertyTestConfig {
    /// Fixed seed for reproducibility (overrides CI default when set).
    pub seed: Option<u64>,
    /// Number of successful cases required.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl PropertyTestConfig {
    /// Build a config with defaults for property tests.
    #[must_use]
    pub fn new(cases: u32) -> Self {
        Self {
            seed: read_proptest_seed(),
            cases,
            max_shrink_iters: read_max_shrink_iters()
                .unwrap_or(ProptestConfig::default().max_shrink_iters),
        }
    }

    /// Convert into a ProptestConfig, applying deterministic seed rules.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        let mut config = ProptestConfig::with_cases(self.cases);

        // Honor existing PROPTEST_RNG_SEED, otherwise apply our own.
        if matches!(config.rng_seed, RngSeed::Random) {
            if let Some(seed) = self.seed {
                config.rng_seed = RngSeed::Fixed(seed);
            }
        }

        config.max_shrink_iters = self.max_shrink_iters;
        config
    }
}

/// Build a ProptestConfig with deterministic seed support for CI.
#[must_use]
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    PropertyTestConfig::new(cases).to_proptest_config()
}

fn read_proptest_seed() -> Option<u64> {
    if let Ok(value) = std::env::var(PROPTEST_SEED_ENV) {
        return value.parse::<u64>().ok();
    }

    // If CI is set and no explicit seed is provided, use a fixed seed.
    if std::env::var("CI").is_ok() {
        return Some(DEFAULT_PROPTEST_SEED);
    }

    None
}

fn read_max_shrink_iters() -> Option<u32> {
    std::env::var(PROPTEST_MAX_SHRINK_ITERS_ENV)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
}

/// Initialize test logging with trace-level output.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Create a runtime with default settings and logging initialized.
#[must_use]
pub fn test_runtime() -> Runtime {
    init_test_logging();
    RuntimeBuilder::new()
        .unhandled_policy(UnhandledPolicy::Record)
        .build()
}

/// Shared event log for ordering assertions.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    /// Snapshot the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// Plain success value as a resolution.
#[must_use]
pub fn value<T>(v: T) -> Resolution<T, Error> {
    Resolution::Value(v)
}

/// Settled outcome of `deferred`, panicking if it is still pending.
pub fn settled<T: Clone + 'static>(deferred: &Deferred<T>) -> Outcome<T, Error> {
    deferred
        .outcome()
        .unwrap_or_else(|| panic!("{} is still pending", deferred.id()))
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}

/// Assert that a deferred value fulfilled with a specific value.
#[macro_export]
macro_rules! assert_fulfilled {
    ($deferred:expr, $expected:expr) => {
        match $deferred.outcome() {
            Some(::asupersync_deferred::Outcome::Fulfilled(v)) => assert_eq!(v, $expected),
            other => panic!("expected Fulfilled({:?}), got {:?}", $expected, other),
        }
    };
}

/// Assert that a deferred value rejected, optionally with a specific failure.
#[macro_export]
macro_rules! assert_rejected {
    ($deferred:expr) => {
        match $deferred.outcome() {
            Some(::asupersync_deferred::Outcome::Rejected(_)) => {}
            other => panic!("expected Rejected, got {:?}", other),
        }
    };
    ($deferred:expr, $expected:expr) => {
        match $deferred.outcome() {
            Some(::asupersync_deferred::Outcome::Rejected(e)) => assert_eq!(e, $expected),
            other => panic!("expected Rejected({:?}), got {:?}", $expected, other),
        }
    };
}
