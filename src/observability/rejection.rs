//! Rejection tracking.
//!
//! A [`RejectionTracker`] listens to the two diagnostic hooks: every rejection
//! opens a record, and attaching a continuation to a rejected value closes
//! it. The records still open are the candidates for "possibly unhandled"
//! reports.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use asupersync_deferred::observability::RejectionTracker;
//! use asupersync_deferred::{Deferred, Error, Resolution, RuntimeBuilder};
//!
//! let tracker = Rc::new(RejectionTracker::new());
//! let runtime = tracker.install(RuntimeBuilder::new()).build();
//!
//! let _lost: Deferred<i32> = runtime.reject_with(Error::user("nobody listens"));
//! let seen: Deferred<i32> = runtime.reject_with(Error::user("observed"));
//! let _recovered = seen.catch_failure(|_| Ok(Resolution::Value(0)));
//!
//! runtime.run_until_idle();
//! assert_eq!(tracker.unhandled().len(), 1);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::runtime::RuntimeBuilder;
use crate::tracing_compat::{info, warn};
use crate::types::DeferredId;

/// One rejection nobody has attached to yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionRecord {
    /// The rejected value.
    pub deferred: DeferredId,
    /// `Debug` rendering of the failure.
    pub failure: String,
    /// Whether [`RejectionTracker::report`] already surfaced this record.
    pub reported: bool,
}

/// Records rejections until they are handled.
///
/// A record lives only while its rejection is unhandled, so a tracker on a
/// long-running runtime holds one entry per outstanding rejection.
#[derive(Default)]
pub struct RejectionTracker {
    records: RefCell<BTreeMap<DeferredId, RejectionRecord>>,
}

impl RejectionTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the tracker's hooks on `builder`.
    ///
    /// Hooks already registered on the builder keep running after the
    /// tracker's own.
    #[must_use]
    pub fn install(self: &Rc<Self>, builder: RuntimeBuilder) -> RuntimeBuilder {
        let previous = builder.hooks().clone();
        let on_attach = Rc::clone(self);
        let on_reject = Rc::clone(self);
        let previous_attach = previous.on_attach;
        let previous_reject = previous.on_reject;
        builder
            .on_attach(move |id| {
                on_attach.handled(id);
                if let Some(hook) = &previous_attach {
                    hook(id);
                }
            })
            .on_reject(move |id, failure| {
                on_reject.rejected(id, failure);
                if let Some(hook) = &previous_reject {
                    hook(id, failure);
                }
            })
    }

    fn rejected(&self, deferred: DeferredId, failure: &dyn fmt::Debug) {
        self.records.borrow_mut().insert(
            deferred,
            RejectionRecord {
                deferred,
                failure: format!("{failure:?}"),
                reported: false,
            },
        );
    }

    fn handled(&self, deferred: DeferredId) {
        let Some(record) = self.records.borrow_mut().remove(&deferred) else {
            return;
        };
        if record.reported {
            info!(
                deferred = %deferred,
                "rejection reported as unhandled was handled later"
            );
        }
    }

    /// Returns the rejections nobody has attached to, in id order.
    #[must_use]
    pub fn unhandled(&self) -> Vec<RejectionRecord> {
        self.records.borrow().values().cloned().collect()
    }

    /// Returns how many rejections are currently unhandled.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.records.borrow().len()
    }

    /// Logs each unhandled rejection not reported before, at warn level.
    ///
    /// Returns how many records were reported by this call.
    pub fn report(&self) -> usize {
        let mut reported = 0;
        for record in self.records.borrow_mut().values_mut() {
            if record.reported {
                continue;
            }
            record.reported = true;
            reported += 1;
            warn!(
                deferred = %record.deferred,
                failure = %record.failure,
                "possibly unhandled rejection"
            );
        }
        reported
    }

    /// Drops every record.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl fmt::Debug for RejectionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RejectionTracker")
            .field("unhandled", &self.records.borrow().len())
            .finish()
    }
}
