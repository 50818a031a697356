//! Listener configuration
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the stock Moontiles setup.

use crate::delivery::DEFAULT_CAPACITY;
use crate::error::{ConfigError, Result};
use crate::types::{Options, REVERSED_KEY};
use crate::webview::PageSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the hosted configuration page
pub const DEFAULT_PAGE_URL: &str = "http://akrs.github.io/moontiles/";

/// Reserved scheme the host treats as "configuration complete"
pub const DEFAULT_CLOSE_SCHEME: &str = "pebblejs";

/// Configuration for the watch-side listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerConfig {
    /// Externally hosted configuration page
    #[serde(default = "default_page_url")]
    pub page_url: String,

    /// Scheme of the sentinel close URL
    #[serde(default = "default_close_scheme")]
    pub close_scheme: String,

    /// Option keys forwarded to the watch app; everything else is dropped
    #[serde(default = "default_forwarded_keys")]
    pub forwarded_keys: Vec<String>,

    /// Options used before the first configuration round trip
    #[serde(default = "Options::with_defaults")]
    pub defaults: Options,

    /// Number of delivery outcomes remembered (0 = unbounded)
    #[serde(default = "default_delivery_log_capacity")]
    pub delivery_log_capacity: usize,
}

fn default_page_url() -> String {
    DEFAULT_PAGE_URL.to_string()
}

fn default_close_scheme() -> String {
    DEFAULT_CLOSE_SCHEME.to_string()
}

fn default_forwarded_keys() -> Vec<String> {
    vec![REVERSED_KEY.to_string()]
}

fn default_delivery_log_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            page_url: default_page_url(),
            close_scheme: default_close_scheme(),
            forwarded_keys: default_forwarded_keys(),
            defaults: Options::with_defaults(),
            delivery_log_capacity: default_delivery_log_capacity(),
        }
    }
}

impl ListenerConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Config(format!("Failed to parse listener config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No listener config, using defaults");
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Config(format!(
                "Failed to read listener config {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            page_url = %config.page_url,
            "Listener config loaded"
        );
        Ok(config)
    }

    /// Check that the config can produce usable URLs and messages
    pub fn validate(&self) -> Result<()> {
        if !(self.page_url.starts_with("http://") || self.page_url.starts_with("https://")) {
            return Err(ConfigError::Config(format!(
                "Page URL must be http(s): {}",
                self.page_url
            )));
        }
        if self.page_url.contains(['?', '#']) {
            return Err(ConfigError::Config(format!(
                "Page URL must not carry a query or fragment: {}",
                self.page_url
            )));
        }

        let scheme_ok = self
            .close_scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && self
                .close_scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return Err(ConfigError::Config(format!(
                "Invalid close scheme: '{}'",
                self.close_scheme
            )));
        }

        if self.forwarded_keys.is_empty() {
            return Err(ConfigError::Config(
                "At least one forwarded key is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings for a configuration page served with this config
    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            close_scheme: self.close_scheme.clone(),
            defaults: self.defaults.clone(),
        }
    }
}
