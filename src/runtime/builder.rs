//! Runtime builder and handles.

use std::fmt;
use std::rc::Rc;

use crate::combinator;
use crate::deferred::{Deferred, Rejecter, Resolver};
use crate::error::BuildError;
use crate::runtime::config::{Hooks, RuntimeConfig, UnhandledFailure, UnhandledPolicy};
use crate::runtime::env_config::apply_env_overrides;
use crate::runtime::literals::LiteralCache;
use crate::runtime::scheduler::Schedule;
use crate::runtime::state::RuntimeState;
use crate::tracing_compat::{debug, trace, warn};
use crate::types::{DeferredId, Failure, Outcome, Resolution, Value};

/// Builder for constructing a runtime with custom configuration.
#[derive(Clone, Debug, Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
}

impl RuntimeBuilder {
    /// Create a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
        }
    }

    /// Apply `ASUPERSYNC_DEFERRED_*` environment overrides.
    ///
    /// Builder calls made after this one take precedence over the environment.
    pub fn from_env(mut self) -> Result<Self, BuildError> {
        apply_env_overrides(&mut self.config)?;
        Ok(self)
    }

    /// Use a custom scheduling collaborator instead of a fresh turn queue.
    #[must_use]
    pub fn scheduler(mut self, scheduler: Rc<dyn Schedule>) -> Self {
        self.config.scheduler = Some(scheduler);
        self
    }

    /// Bound the number of turns one `run_until_idle` call may execute
    /// (0 = unbounded).
    #[must_use]
    pub fn max_turns(mut self, turns: u64) -> Self {
        self.config.max_turns = turns;
        self
    }

    /// Set the policy for unhandled terminal failures.
    #[must_use]
    pub fn unhandled_policy(mut self, policy: UnhandledPolicy) -> Self {
        self.config.unhandled = policy;
        self
    }

    /// Enable or disable the literal singleton cache.
    #[must_use]
    pub fn literal_cache(mut self, enable: bool) -> Self {
        self.config.literal_cache = enable;
        self
    }

    /// Register a callback invoked whenever a continuation is attached.
    #[must_use]
    pub fn on_attach<F>(mut self, f: F) -> Self
    where
        F: Fn(DeferredId) + 'static,
    {
        self.config.hooks.on_attach = Some(Rc::new(f));
        self
    }

    /// Register a callback invoked whenever a value is rejected.
    #[must_use]
    pub fn on_reject<F>(mut self, f: F) -> Self
    where
        F: Fn(DeferredId, &dyn fmt::Debug) + 'static,
    {
        self.config.hooks.on_reject = Some(Rc::new(f));
        self
    }

    /// Returns the hooks configured so far.
    #[must_use]
    pub fn hooks(&self) -> &Hooks {
        &self.config.hooks
    }

    /// Returns the configuration assembled so far.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Build a runtime from this configuration.
    #[must_use]
    pub fn build(self) -> Runtime {
        Runtime::with_config(self.config)
    }
}

/// Runtime instance created from a [`RuntimeBuilder`].
///
/// Cloning the handle is cheap; clones share the scheduler, hooks and
/// unhandled-failure log.
#[derive(Clone)]
pub struct Runtime {
    state: Rc<RuntimeState>,
    literals: Rc<LiteralCache>,
    config: RuntimeConfig,
}

impl Runtime {
    /// Construct a runtime from the given configuration.
    #[must_use]
    pub fn with_config(mut config: RuntimeConfig) -> Self {
        config.normalize();
        debug!(config = ?config, "runtime built");
        Self {
            state: Rc::new(RuntimeState::new(&config)),
            literals: Rc::new(LiteralCache::default()),
            config,
        }
    }

    /// Construct a runtime with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub(crate) fn state(&self) -> &Rc<RuntimeState> {
        &self.state
    }

    /// Returns the runtime configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Construction and combinators
    // ------------------------------------------------------------------

    /// Creates a deferred value, running `starter` synchronously.
    pub fn deferred<T, E, F>(&self, starter: F) -> Deferred<T, E>
    where
        T: Value,
        E: Failure,
        F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>,
    {
        Deferred::new(self, starter)
    }

    /// Creates a pending value together with its resolver and rejecter.
    #[must_use]
    pub fn pending<T: Value, E: Failure>(&self) -> (Deferred<T, E>, Resolver<T, E>, Rejecter<T, E>) {
        Deferred::pending(self)
    }

    /// Wraps a value as a deferred value; see [`combinator::resolve_value`].
    pub fn resolve_value<T: Value, E: Failure>(&self, value: Resolution<T, E>) -> Deferred<T, E> {
        combinator::resolve_value(self, value)
    }

    /// Shorthand for `resolve_value(Resolution::Value(value))`.
    pub fn fulfilled<T: Value, E: Failure>(&self, value: T) -> Deferred<T, E> {
        combinator::resolve_value(self, Resolution::Value(value))
    }

    /// Creates a value already rejected with `failure`.
    pub fn reject_with<T: Value, E: Failure>(&self, failure: E) -> Deferred<T, E> {
        combinator::reject_with(self, failure)
    }

    /// Fulfills with every result once all inputs fulfill; see [`combinator::all_of`].
    pub fn all_of<T: Value, E: Failure>(&self, items: Vec<Resolution<T, E>>) -> Deferred<Vec<T>, E> {
        combinator::all_of(self, items)
    }

    /// Fulfills with every outcome once all inputs settle; see [`combinator::all_settled`].
    pub fn all_settled<T: Value, E: Failure>(
        &self,
        items: Vec<Resolution<T, E>>,
    ) -> Deferred<Vec<Outcome<T, E>>, E> {
        combinator::all_settled(self, items)
    }

    /// Settles like the first input to settle; see [`combinator::first_settled`].
    pub fn first_settled<T: Value, E: Failure>(&self, items: Vec<Resolution<T, E>>) -> Deferred<T, E> {
        combinator::first_settled(self, items)
    }

    pub(crate) fn literal_fulfilled<T: Value, E: Failure>(&self, value: T) -> Deferred<T, E> {
        if self.config.literal_cache {
            self.literals.fulfilled(&self.state, value)
        } else {
            Deferred::fulfilled(&self.state, value)
        }
    }

    /// Returns the number of literal singletons created so far.
    #[must_use]
    pub fn cached_literals(&self) -> usize {
        self.literals.len()
    }

    // ------------------------------------------------------------------
    // Driving
    // ------------------------------------------------------------------

    /// Runs one queued turn. Returns `false` when nothing was queued.
    pub fn run_turn(&self) -> bool {
        self.state.scheduler().run_next()
    }

    /// Runs turns until the queue is empty or `max_turns` is reached.
    ///
    /// Returns the number of turns executed.
    pub fn run_until_idle(&self) -> u64 {
        let max = self.config.max_turns;
        let mut turns = 0_u64;
        loop {
            if max != 0 && turns >= max {
                warn!(
                    turns,
                    queued = self.queued_turns(),
                    "turn budget exhausted before the runtime went idle"
                );
                break;
            }
            if !self.state.scheduler().run_next() {
                break;
            }
            turns += 1;
        }
        trace!(turns, "run_until_idle finished");
        turns
    }

    /// Returns the number of queued turns.
    #[must_use]
    pub fn queued_turns(&self) -> usize {
        self.state.scheduler().queued()
    }

    /// Returns true if no turn is queued.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queued_turns() == 0
    }

    /// Takes the failures recorded under [`UnhandledPolicy::Record`].
    pub fn take_unhandled(&self) -> Vec<UnhandledFailure> {
        self.state.take_unhandled()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("state", &self.state)
            .field("cached_literals", &self.literals.len())
            .finish()
    }
}
