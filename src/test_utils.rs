//! Test utilities for unit tests.
//!
//! This module provides shared helpers:
//! - Consistent tracing-based logging initialization
//! - Runtime constructors
//! - A scheduler wrapper that logs every turn

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use tracing_subscriber::fmt::format::FmtSpan;

use crate::runtime::{Runtime, RuntimeBuilder, Schedule, Task, TurnQueue, UnhandledPolicy};

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
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

/// Create a runtime with logging initialized and failures recorded.
#[must_use]
pub fn test_runtime() -> Runtime {
    init_test_logging();
    RuntimeBuilder::new()
        .unhandled_policy(UnhandledPolicy::Record)
        .build()
}

/// A turn queue that records a label per executed turn.
#[derive(Debug, Default)]
pub struct LoggingQueue {
    inner: TurnQueue,
    log: RefCell<Vec<usize>>,
}

impl LoggingQueue {
    /// Returns the queue length observed before each executed turn.
    pub fn depths(&self) -> Vec<usize> {
        self.log.borrow().clone()
    }
}

impl Schedule for LoggingQueue {
    fn schedule(&self, task: Task) {
        self.inner.schedule(task);
    }

    fn run_next(&self) -> bool {
        let depth = self.inner.queued();
        if depth > 0 {
            self.log.borrow_mut().push(depth);
        }
        self.inner.run_next()
    }

    fn queued(&self) -> usize {
        self.inner.queued()
    }
}

/// Create a runtime driven by a [`LoggingQueue`].
#[must_use]
pub fn logged_runtime() -> (Runtime, Rc<LoggingQueue>) {
    init_test_logging();
    let queue = Rc::new(LoggingQueue::default());
    let runtime = RuntimeBuilder::new().scheduler(queue.clone()).build();
    (runtime, queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::Deferred;
    use crate::error::Error;

    #[test]
    fn logging_queue_tracks_depth() {
        let (rt, queue) = logged_runtime();
        let value: Deferred<i32, Error> = rt.fulfilled(1);
        let _a = value.map(|v| v);
        let _b = value.map(|v| v);
        rt.run_until_idle();
        assert_eq!(queue.depths(), vec![2, 1]);
    }
}
