//! Runtime configuration types.
//!
//! These types hold the concrete values that drive runtime behavior. In most
//! cases you should use [`RuntimeBuilder`](super::builder::RuntimeBuilder) to
//! construct a runtime rather than creating a [`RuntimeConfig`] directly.
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `scheduler` | `None` (a fresh [`TurnQueue`]) |
//! | `max_turns` | 1_000_000 (0 = unbounded) |
//! | `unhandled` | [`UnhandledPolicy::Record`] |
//! | `literal_cache` | true |
//! | `hooks` | no-ops |

use std::fmt;
use std::rc::Rc;

use crate::runtime::scheduler::{Schedule, TurnQueue};
use crate::types::DeferredId;

/// Callback invoked with the deferred value a continuation is attached to.
pub type AttachHook = Rc<dyn Fn(DeferredId)>;

/// Callback invoked with a deferred value and the failure it was rejected with.
pub type RejectHook = Rc<dyn Fn(DeferredId, &dyn fmt::Debug)>;

/// Diagnostic hooks.
///
/// Hooks observe the engine; they are called outside of any internal borrow
/// and their return value is ignored, so they cannot change settlement
/// outcome or timing.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Called whenever a continuation is attached (after adoption is
    /// dereferenced, so the id is the value that actually holds the waiter).
    pub on_attach: Option<AttachHook>,
    /// Called whenever a value is rejected.
    pub on_reject: Option<RejectHook>,
}

impl Hooks {
    pub(crate) fn attached(&self, id: DeferredId) {
        if let Some(hook) = &self.on_attach {
            hook(id);
        }
    }

    pub(crate) fn rejected(&self, id: DeferredId, failure: &dyn fmt::Debug) {
        if let Some(hook) = &self.on_reject {
            hook(id, failure);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_attach", &self.on_attach.is_some())
            .field("on_reject", &self.on_reject.is_some())
            .finish()
    }
}

/// What happens to a failure that reaches a terminal consumer unhandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnhandledPolicy {
    /// Log the failure and keep it for [`Runtime::take_unhandled`].
    ///
    /// [`Runtime::take_unhandled`]: super::Runtime::take_unhandled
    #[default]
    Record,
    /// Panic on the turn that raises the failure.
    Panic,
}

impl UnhandledPolicy {
    /// Parses a policy name (`record` or `panic`, case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "record" => Some(Self::Record),
            "panic" => Some(Self::Panic),
            _ => None,
        }
    }
}

/// A failure that reached a terminal consumer with no failure handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledFailure {
    /// The value whose rejection went unhandled.
    pub deferred: DeferredId,
    /// Debug rendering of the failure.
    pub message: String,
}

/// Runtime configuration.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Scheduling collaborator; `None` means a fresh [`TurnQueue`].
    pub scheduler: Option<Rc<dyn Schedule>>,
    /// Upper bound on turns executed by one `run_until_idle` call (0 = unbounded).
    pub max_turns: u64,
    /// Policy for unhandled terminal failures.
    pub unhandled: UnhandledPolicy,
    /// Whether `resolve_value` reuses settled singletons for literal values.
    pub literal_cache: bool,
    /// Diagnostic hooks.
    pub hooks: Hooks,
}

impl RuntimeConfig {
    /// Default turn bound for `run_until_idle`.
    pub const DEFAULT_MAX_TURNS: u64 = 1_000_000;

    /// Normalize configuration values to safe defaults.
    pub fn normalize(&mut self) {
        if self.scheduler.is_none() {
            self.scheduler = Some(Rc::new(TurnQueue::new()));
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scheduler: None,
            max_turns: Self::DEFAULT_MAX_TURNS,
            unhandled: UnhandledPolicy::default(),
            literal_cache: true,
            hooks: Hooks::default(),
        }
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("scheduler", &self.scheduler.is_some())
            .field("max_turns", &self.max_turns)
            .field("unhandled", &self.unhandled)
            .field("literal_cache", &self.literal_cache)
            .field("hooks", &self.hooks)
            .finish()
    }
}
