//! Environment variable support for [`RuntimeBuilder`](super::builder::RuntimeBuilder).
//!
//! # Configuration Precedence
//!
//! 1. **Programmatic**: values set via builder methods after `from_env()`
//! 2. **Environment variables**: values from `ASUPERSYNC_DEFERRED_*` env vars
//! 3. **Defaults**: built-in defaults from [`RuntimeConfig::default()`]
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `ASUPERSYNC_DEFERRED_MAX_TURNS` | `u64` | `max_turns` |
//! | `ASUPERSYNC_DEFERRED_UNHANDLED` | `record` \| `panic` | `unhandled` |
//! | `ASUPERSYNC_DEFERRED_LITERAL_CACHE` | `bool` | `literal_cache` |

use crate::error::BuildError;
use crate::runtime::config::{RuntimeConfig, UnhandledPolicy};

/// Environment variable name for the per-drain turn bound.
pub const ENV_MAX_TURNS: &str = "ASUPERSYNC_DEFERRED_MAX_TURNS";
/// Environment variable name for the unhandled failure policy.
pub const ENV_UNHANDLED: &str = "ASUPERSYNC_DEFERRED_UNHANDLED";
/// Environment variable name for the literal singleton cache toggle.
pub const ENV_LITERAL_CACHE: &str = "ASUPERSYNC_DEFERRED_LITERAL_CACHE";

/// Apply environment variable overrides to a [`RuntimeConfig`].
///
/// Only variables that are set in the environment are applied.
/// Returns an error if a variable is set but contains an unparseable value.
pub fn apply_env_overrides(config: &mut RuntimeConfig) -> Result<(), BuildError> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup` (the environment, or a map in tests).
pub(crate) fn apply_overrides<F>(config: &mut RuntimeConfig, lookup: F) -> Result<(), BuildError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_MAX_TURNS) {
        config.max_turns = parse_u64(ENV_MAX_TURNS, &val)?;
    }
    if let Some(val) = lookup(ENV_UNHANDLED) {
        config.unhandled = UnhandledPolicy::parse(&val).ok_or_else(|| BuildError::InvalidEnv {
            var: ENV_UNHANDLED,
            expected: "record or panic",
            value: val.clone(),
        })?;
    }
    if let Some(val) = lookup(ENV_LITERAL_CACHE) {
        config.literal_cache = parse_bool(ENV_LITERAL_CACHE, &val)?;
    }
    Ok(())
}

fn parse_u64(var: &'static str, val: &str) -> Result<u64, BuildError> {
    val.trim().parse::<u64>().map_err(|_| BuildError::InvalidEnv {
        var,
        expected: "unsigned integer",
        value: val.to_string(),
    })
}

fn parse_bool(var: &'static str, val: &str) -> Result<bool, BuildError> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(BuildError::InvalidEnv {
            var,
            expected: "bool (true/false/1/0/yes/no)",
            value: val.to_string(),
        }),
    }
}
