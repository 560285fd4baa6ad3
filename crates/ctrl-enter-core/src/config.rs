//! Session configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```rust
//! use ctrl_enter_core::{Config, SiteFamily, WatchPolicy};
//! use std::time::Duration;
//!
//! let config = Config::from_json(r#"{
//!     "family": "universal",
//!     "watch": { "mode": "debounced", "interval_ms": 500 },
//!     "fallback_delay_ms": 150
//! }"#).unwrap();
//!
//! assert_eq!(config.family(), SiteFamily::Universal);
//! assert_eq!(config.watch_policy(), WatchPolicy::Debounced { interval: Duration::from_millis(500) });
//! assert_eq!(config.fallback_delay(), Duration::from_millis(150));
//! ```

use crate::error::ConfigError;
use crate::selector::parse_all;
use crate::site::{PatternTable, SiteFamily, SubmitPatterns};
use crate::watcher::WatchPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wait before the submission fallback re-queries the store.
pub const DEFAULT_FALLBACK_DELAY_MS: u64 = 100;

/// Default class marking framework-managed editors.
pub const DEFAULT_FRAMEWORK_MARKER: &str = "ProseMirror";

/// Default attribute marking an instrumented editor.
pub const DEFAULT_ATTACHMENT_MARKER: &str = "data-ctrl-enter-attached";

/// Configuration of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site family; `None` means [`SiteFamily::Universal`].
    pub family: Option<SiteFamily>,
    /// Overrides the family's default watch policy.
    pub watch: Option<WatchPolicy>,
    /// Delay before the fallback restores the enabled flag from the store.
    pub fallback_delay_ms: u64,
    /// Class that marks a framework-managed editable region.
    pub framework_marker_class: String,
    /// Attribute set on an editor once its interceptors are installed.
    pub attachment_marker: String,
    /// Replaces the family's built-in table.
    pub table: Option<PatternTable>,
    /// Submission control patterns.
    pub submit: SubmitPatterns,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            family: None,
            watch: None,
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY_MS,
            framework_marker_class: DEFAULT_FRAMEWORK_MARKER.to_string(),
            attachment_marker: DEFAULT_ATTACHMENT_MARKER.to_string(),
            table: None,
            submit: SubmitPatterns::default(),
        }
    }
}

impl Config {
    /// Defaults for the family serving `host`.
    pub fn for_host(host: &str) -> Self {
        Self::for_family(SiteFamily::for_host(host))
    }

    /// Defaults for `family`.
    pub fn for_family(family: SiteFamily) -> Self {
        Self {
            family: Some(family),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the editor table with `patterns` (version 0, current family).
    pub fn with_patterns(mut self, patterns: &[&str]) -> Result<Self, ConfigError> {
        self.table = Some(PatternTable {
            family: self.family(),
            version: 0,
            patterns: parse_all(patterns.iter().copied())?,
        });
        Ok(self)
    }

    /// Effective site family.
    pub fn family(&self) -> SiteFamily {
        self.table
            .as_ref()
            .map(|table| table.family)
            .or(self.family)
            .unwrap_or(SiteFamily::Universal)
    }

    /// Effective editor table.
    pub fn pattern_table(&self) -> PatternTable {
        self.table
            .clone()
            .unwrap_or_else(|| self.family().table())
    }

    /// Effective watch policy.
    pub fn watch_policy(&self) -> WatchPolicy {
        self.watch
            .unwrap_or_else(|| self.family().default_watch_policy())
    }

    /// Fallback reconciliation delay.
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(WatchPolicy::Debounced { interval }) = self.watch
            && interval.is_zero()
        {
            return Err(ConfigError::ZeroDebounce);
        }
        Ok(())
    }
}
