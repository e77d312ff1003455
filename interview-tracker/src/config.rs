//! Configuration types for health evaluation and logging.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::TrackerError;
use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};

/// Environment variable overriding [`TrackerConfig::log_level`].
pub const LOG_LEVEL_ENV: &str = "INTERVIEW_TRACKER_LOG";

/// Environment variable overriding [`TrackerConfig::json_logs`].
pub const JSON_LOGS_ENV: &str = "INTERVIEW_TRACKER_JSON_LOGS";

/// Environment variable overriding [`TrackerConfig::log_events`].
pub const LOG_EVENTS_ENV: &str = "INTERVIEW_TRACKER_LOG_EVENTS";

/// Day thresholds used by the health evaluator.
///
/// All thresholds are exclusive: a value equal to the threshold does not
/// cross it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// Days without news after which a pipeline needs a follow-up.
    #[serde(default = "default_followup_days")]
    pub followup_after_days: i64,
    /// Days without updates after which a pipeline is stale.
    #[serde(default = "default_stale_days")]
    pub stale_after_days: i64,
    /// Days an awaiting interview may wait before it is surfaced for attention.
    #[serde(default = "default_attention_days")]
    pub attention_awaiting_after_days: i64,
}

fn default_followup_days() -> i64 {
    5
}

fn default_stale_days() -> i64 {
    10
}

fn default_attention_days() -> i64 {
    3
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            followup_after_days: default_followup_days(),
            stale_after_days: default_stale_days(),
            attention_awaiting_after_days: default_attention_days(),
        }
    }
}

impl HealthThresholds {
    /// Creates thresholds with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the follow-up threshold.
    #[must_use]
    pub fn with_followup_after_days(mut self, days: i64) -> Self {
        self.followup_after_days = days;
        self
    }

    /// Sets the stale threshold.
    #[must_use]
    pub fn with_stale_after_days(mut self, days: i64) -> Self {
        self.stale_after_days = days;
        self
    }

    /// Sets the attention threshold for awaiting pipelines.
    #[must_use]
    pub fn with_attention_awaiting_after_days(mut self, days: i64) -> Self {
        self.attention_awaiting_after_days = days;
        self
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Health thresholds.
    #[serde(default)]
    pub thresholds: HealthThresholds,
    /// `tracing` filter directive, e.g. `info` or `interview_tracker=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json_logs: bool,
    /// Log every pipeline event through [`LoggingEventSink`].
    #[serde(default)]
    pub log_events: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            thresholds: HealthThresholds::default(),
            log_level: default_log_level(),
            json_logs: false,
            log_events: false,
        }
    }
}

impl TrackerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, TrackerError> {
        serde_json::from_str(json).map_err(|e| TrackerError::Config(e.to_string()))
    }

    /// Defaults overridden by environment variables.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` if a boolean override is not a boolean.
    pub fn from_env() -> Result<Self, TrackerError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from a key lookup.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` if a boolean override is not a boolean.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }

        if let Some(raw) = lookup(JSON_LOGS_ENV) {
            self.json_logs = parse_bool(JSON_LOGS_ENV, &raw)?;
        }
        if let Some(raw) = lookup(LOG_EVENTS_ENV) {
            self.log_events = parse_bool(LOG_EVENTS_ENV, &raw)?;
        }

        Ok(self)
    }

    /// Sets the thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Sets the log level directive.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enables or disables JSON logs.
    #[must_use]
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Enables or disables event logging.
    #[must_use]
    pub fn with_log_events(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    /// The event sink this configuration asks for.
    #[must_use]
    pub fn event_sink(&self) -> Arc<dyn EventSink> {
        if self.log_events {
            Arc::new(LoggingEventSink::default())
        } else {
            Arc::new(NoOpEventSink)
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, TrackerError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(TrackerError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}
