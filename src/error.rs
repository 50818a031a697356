//! Error types for moontiles-config

use crate::types::TransactionId;
use thiserror::Error;

/// Errors that can occur during the configuration hand-off
///
/// None of these are fatal: the listener and the page log them and fall
/// back to the current or default options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Percent-decoding or JSON parsing of a hand-off payload failed
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The webview was opened without a query string
    #[error("No options payload in page URL")]
    MissingQueryString,

    /// The host reported that an app message was not delivered
    #[error("Message {transaction_id} was not delivered: {reason}")]
    MessageDelivery {
        transaction_id: TransactionId,
        reason: String,
    },

    /// Host runtime primitive failure (e.g. opening the config page)
    #[error("Host error: {0}")]
    Host(String),

    /// Form control index outside the list of choices
    #[error("Selection index {index} out of range (control has {len} choices)")]
    InvalidSelection { index: usize, len: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for configuration hand-off operations
pub type Result<T> = std::result::Result<T, ConfigError>;
