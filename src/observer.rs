//! Observer name resolution.
//!
//! The observer is asked for when a session starts. To save typing, a default
//! is resolved through a chain:
//!
//! 1. `--observer <name>` — explicit per-run override
//! 2. `WRENCH_TIME_OBSERVER` env var — set once per shell or device
//! 3. `default-observer` in `~/.wrench-time/config.toml`
//!
//! When none of them yields a name, the observer must be typed in.

use std::env;

use crate::config::Config;

pub const OBSERVER_ENV: &str = "WRENCH_TIME_OBSERVER";

/// Resolve the default observer name from the chain above.
pub fn resolve_observer(explicit: Option<&str>, config: &Config) -> Option<String> {
    resolve_from(explicit, env::var(OBSERVER_ENV).ok(), config)
}

fn resolve_from(
    explicit: Option<&str>,
    from_env: Option<String>,
    config: &Config,
) -> Option<String> {
    // 1. Explicit flag.
    if let Some(name) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(name.to_string());
    }

    // 2. Environment.
    if let Some(name) = from_env.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return Some(name.to_string());
    }

    // 3. Config file.
    config
        .default_observer
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
