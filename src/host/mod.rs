//! Host runtime trait — the watch platform's event and messaging surface
//!
//! The phone-side runtime emits lifecycle events and exposes two
//! primitives: opening an external page and sending an app message to the
//! watch. This crate only consumes them; implementations adapt the real
//! runtime, and `MemoryHost` stands in for it in tests.

use crate::error::Result;
use crate::types::{AppMessage, MessageOutcome};
use async_trait::async_trait;

pub mod memory;

/// Lifecycle events emitted by the host runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The runtime finished starting the app
    Ready,
    /// The user asked for the configuration page
    ShowConfiguration,
    /// The configuration webview closed
    ///
    /// `response` is the still percent-encoded fragment of the close URL;
    /// empty when the user dismissed the page.
    WebviewClosed { response: String },
}

impl HostEvent {
    /// Event name as the runtime reports it
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::Ready => "ready",
            HostEvent::ShowConfiguration => "showConfiguration",
            HostEvent::WebviewClosed { .. } => "webviewclosed",
        }
    }
}

/// Core trait for host runtimes
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Open an external page in the host's webview
    async fn open_url(&self, url: &str) -> Result<()>;

    /// Send a message to the running watch app
    ///
    /// Resolves once the host knows the outcome. The transaction id in the
    /// outcome is assigned by the host.
    async fn send_app_message(&self, message: &AppMessage) -> MessageOutcome;

    /// Host name (e.g., "pebble", "memory")
    fn name(&self) -> &str;
}
