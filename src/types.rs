//! Core types for the configuration hand-off
//!
//! All types use camelCase JSON serialization for wire compatibility with
//! the configuration page.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Option key holding the display orientation flag
pub const REVERSED_KEY: &str = "reversed";

/// A single scalar option value
///
/// Options are always flat JSON: objects and arrays do not deserialize
/// into any variant and are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl OptionValue {
    /// Read the value as an integer flag
    ///
    /// Booleans map to 0/1, floats are truncated, numeric strings are
    /// parsed. Anything else reads as 0.
    pub fn as_flag(&self) -> i64 {
        match self {
            OptionValue::Int(n) => *n,
            OptionValue::Bool(b) => i64::from(*b),
            OptionValue::Float(f) => *f as i64,
            OptionValue::Str(s) => s.trim().parse().unwrap_or(0),
            OptionValue::Null => 0,
        }
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(i64::from(v))
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

/// Flat settings object exchanged between the watch app and the webview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options {
    values: BTreeMap<String, OptionValue>,
}

impl Options {
    /// Create an empty options object
    pub fn new() -> Self {
        Self::default()
    }

    /// The declared defaults: `{"reversed": 0}`
    pub fn with_defaults() -> Self {
        Self::new().with(REVERSED_KEY, 0)
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Parse options from an already-decoded JSON value
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ConfigError::MalformedPayload(format!(
                "expected a JSON object, got {}",
                value
            )));
        }
        serde_json::from_value(value).map_err(|e| {
            ConfigError::MalformedPayload(format!("options must be flat scalars: {}", e))
        })
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.values.iter()
    }

    /// The display orientation flag; absent reads as 0
    pub fn reversed(&self) -> i64 {
        self.get(REVERSED_KEY).map(OptionValue::as_flag).unwrap_or(0)
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.set(REVERSED_KEY, i64::from(reversed));
    }

    /// Copy containing only the listed keys that are present
    pub fn narrow<S: AsRef<str>>(&self, keys: &[S]) -> Self {
        let values = keys
            .iter()
            .filter_map(|k| {
                let k = k.as_ref();
                self.values.get(k).map(|v| (k.to_string(), v.clone()))
            })
            .collect();
        Self { values }
    }

    /// Fill missing keys from `defaults` without overwriting present ones
    pub fn merge_defaults(&mut self, defaults: &Options) {
        for (key, value) in &defaults.values {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

/// Outbound message for the running watch app
///
/// Carries only the fields the app understands; everything else in the
/// returned options is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppMessage(Options);

impl AppMessage {
    pub fn from_options<S: AsRef<str>>(options: &Options, keys: &[S]) -> Self {
        Self(options.narrow(keys))
    }

    pub fn fields(&self) -> &Options {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Host-assigned identifier correlating a message with its delivery outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u32);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of sending an app message through the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum MessageOutcome {
    /// The watch acknowledged the message
    #[serde(rename_all = "camelCase")]
    Delivered { transaction_id: TransactionId },
    /// The host gave up on the message; not retried
    #[serde(rename_all = "camelCase")]
    Failed {
        transaction_id: TransactionId,
        reason: String,
    },
}

impl MessageOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, MessageOutcome::Delivered { .. })
    }

    pub fn transaction_id(&self) -> TransactionId {
        match self {
            MessageOutcome::Delivered { transaction_id }
            | MessageOutcome::Failed { transaction_id, .. } => *transaction_id,
        }
    }

    /// Convert a failed outcome into a `MessageDelivery` error
    pub fn into_result(self) -> Result<TransactionId> {
        match self {
            MessageOutcome::Delivered { transaction_id } => Ok(transaction_id),
            MessageOutcome::Failed {
                transaction_id,
                reason,
            } => Err(ConfigError::MessageDelivery {
                transaction_id,
                reason,
            }),
        }
    }
}

/// Monochrome display color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

/// Watch face color scheme selected by the `reversed` flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayTheme {
    /// White tiles on a black background
    #[default]
    Normal,
    /// Black tiles on a white background
    Reversed,
}

impl DisplayTheme {
    pub fn from_options(options: &Options) -> Self {
        if options.reversed() != 0 {
            DisplayTheme::Reversed
        } else {
            DisplayTheme::Normal
        }
    }

    pub fn foreground(self) -> Color {
        match self {
            DisplayTheme::Normal => Color::White,
            DisplayTheme::Reversed => Color::Black,
        }
    }

    pub fn background(self) -> Color {
        match self {
            DisplayTheme::Normal => Color::Black,
            DisplayTheme::Reversed => Color::White,
        }
    }
}
