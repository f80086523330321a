// Configuration models for DevFlow
// Global config file plus per-invocation overrides (CLI flags, environment)

use serde::{Deserialize, Serialize};

/// All settings (stored in ~/.devflow/config.json, can be overridden per invocation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serverUrl: Option<String>,
    pub pollIntervalSecs: u64,
    pub requestTimeoutSecs: u64,
    pub strictDateFilter: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serverUrl: None,
            pollIntervalSecs: 3,
            requestTimeoutSecs: 5,
            strictDateFilter: false,
        }
    }
}

/// Partial settings for overrides (all fields optional)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serverUrl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pollIntervalSecs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requestTimeoutSecs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strictDateFilter: Option<bool>,
}

impl Settings {
    /// Merge with an override; an empty server URL clears the configured one
    pub fn withOverride(&self, over: &SettingsOverride) -> Self {
        let serverUrl = match &over.serverUrl {
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url.trim().to_string()),
            None => self.serverUrl.clone(),
        };
        Self {
            serverUrl,
            pollIntervalSecs: over.pollIntervalSecs.unwrap_or(self.pollIntervalSecs).max(1),
            requestTimeoutSecs: over.requestTimeoutSecs.unwrap_or(self.requestTimeoutSecs).max(1),
            strictDateFilter: over.strictDateFilter.unwrap_or(self.strictDateFilter),
        }
    }
}
