//! Console settings: module endpoint and the three cadences
//!
//! Defaults can be overridden through `MODSCOPE_*` environment variables;
//! the binaries layer their own flags on top.

use std::time::Duration;

use tracing::{info, warn};

/// Default module control endpoint (override with MODSCOPE_URL)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/";
/// Chart window: last 5 minutes
pub const DEFAULT_DISPLAY_WINDOW: Duration = Duration::from_millis(300_000);
/// Stats are collected every 2 seconds
pub const DEFAULT_SAMPLE_RATE: Duration = Duration::from_millis(2000);
/// Charts are redrawn every second
pub const DEFAULT_UPDATE_RATE: Duration = Duration::from_millis(1000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub base_url: String,
    pub display_window: Duration,
    pub sample_rate: Duration,
    pub update_rate: Duration,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            display_window: DEFAULT_DISPLAY_WINDOW,
            sample_rate: DEFAULT_SAMPLE_RATE,
            update_rate: DEFAULT_UPDATE_RATE,
        }
    }
}

impl ConsoleSettings {
    /// Defaults, overridden by whatever `MODSCOPE_*` variables are set
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = lookup("MODSCOPE_URL").unwrap_or(defaults.base_url);
        let settings = Self {
            base_url,
            display_window: millis_var(&lookup, "MODSCOPE_WINDOW_MS", defaults.display_window),
            sample_rate: millis_var(&lookup, "MODSCOPE_SAMPLE_MS", defaults.sample_rate),
            update_rate: millis_var(&lookup, "MODSCOPE_UPDATE_MS", defaults.update_rate),
        };
        info!(
            url = %settings.base_url,
            window_ms = settings.display_window.as_millis() as u64,
            sample_ms = settings.sample_rate.as_millis() as u64,
            update_ms = settings.update_rate.as_millis() as u64,
            "Console settings resolved"
        );
        settings
    }

    /// Override with explicitly given values, keeping the rest
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        window_ms: Option<u64>,
        sample_ms: Option<u64>,
        update_ms: Option<u64>,
    ) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self.display_window = override_millis("window", window_ms, self.display_window);
        self.sample_rate = override_millis("sample", sample_ms, self.sample_rate);
        self.update_rate = override_millis("update", update_ms, self.update_rate);
        self
    }
}

fn millis_var(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => {
            warn!(key, value = %raw, "Ignoring invalid duration, expected positive milliseconds");
            default
        }
    }
}

fn override_millis(name: &str, value: Option<u64>, current: Duration) -> Duration {
    match value {
        Some(0) => {
            warn!(name, "Ignoring zero duration override");
            current
        }
        Some(ms) => Duration::from_millis(ms),
        None => current,
    }
}
