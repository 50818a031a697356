//! # moontiles-config
//!
//! Configuration hand-off between the Moontiles watch face and its
//! settings webview.
//!
//! ## Overview
//!
//! Options travel as percent-encoded JSON in both directions:
//!
//! 1. The watch-side [`ConfigListener`] opens the hosted page with the
//!    current options in the query string.
//! 2. The page ([`ConfigPage`]) shows them in a dropdown and, on close,
//!    navigates to `pebblejs://close#<encoded-json>`.
//! 3. The listener decodes the result and forwards only the fields the
//!    watch app understands through the host's app-message primitive.
//!
//! ## Quick Start
//!
//! ```rust
//! use moontiles_config::{ConfigListener, ConfigPage, HostEvent, ListenerConfig, MemoryHost};
//!
//! # async fn example() -> moontiles_config::Result<()> {
//! let config = ListenerConfig::default();
//! let mut listener = ConfigListener::new(MemoryHost::new(), config.clone());
//!
//! listener.dispatch(HostEvent::ShowConfiguration).await?;
//! let opened = listener.host().opened_urls().await;
//!
//! let mut page = ConfigPage::load(&opened[0], config.page_settings());
//! page.chooser_mut().select_value("reversed")?;
//! let close_url = page.close()?;
//!
//! let response = moontiles_config::codec::close_payload(&close_url, &config.close_scheme)?;
//! let outcome = listener
//!     .dispatch(HostEvent::WebviewClosed { response: response.to_string() })
//!     .await?;
//! assert!(outcome.map(|o| o.is_delivered()).unwrap_or(false));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **HostRuntime** trait — the platform's open-page and app-message primitives
//! - **ConfigListener** — watch-side event handling and message narrowing
//! - **ConfigPage** — webview-side load/close controller
//! - **codec** — the URL-encoded JSON contract shared by both sides

pub mod codec;
pub mod config;
pub mod delivery;
pub mod error;
pub mod host;
pub mod listener;
pub mod types;
pub mod webview;

// Re-export core types
pub use config::ListenerConfig;
pub use delivery::{DeliveryLog, DeliveryRecord};
pub use error::{ConfigError, Result};
pub use host::{HostEvent, HostRuntime};
pub use listener::{ConfigListener, ListenerState};
pub use types::{
    AppMessage, Color, DisplayTheme, MessageOutcome, OptionValue, Options, TransactionId,
};
pub use webview::{ConfigPage, Dropdown, PageSettings};

// Re-export the in-memory host for convenience
pub use host::memory::MemoryHost;
