//! Watch-side configuration listener
//!
//! Bridges the host runtime's configuration lifecycle to the running watch
//! app:
//!
//! - `showConfiguration` opens the config page with the current options
//!   in the query string.
//! - `webviewclosed` decodes the returned options and forwards the fields
//!   the app understands as an app message.
//!
//! Malformed results are logged and dropped; nothing here panics on bad
//! input.

use crate::codec;
use crate::config::ListenerConfig;
use crate::delivery::DeliveryLog;
use crate::error::Result;
use crate::host::{HostEvent, HostRuntime};
use crate::types::{AppMessage, MessageOutcome, Options};

/// Response some hosts report when the user cancels the webview
const CANCELLED_RESPONSE: &str = "CANCELLED";

/// Where the listener is in the configuration round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    AwaitingWebviewResult,
}

/// Configuration listener driven by host events
pub struct ConfigListener<H: HostRuntime> {
    host: H,
    config: ListenerConfig,
    options: Options,
    state: ListenerState,
    session_id: Option<String>,
    deliveries: DeliveryLog,
}

impl<H: HostRuntime> ConfigListener<H> {
    /// Create a listener starting from the configured defaults
    pub fn new(host: H, config: ListenerConfig) -> Self {
        let options = config.defaults.clone();
        let deliveries = DeliveryLog::new(config.delivery_log_capacity);
        Self {
            host,
            config,
            options,
            state: ListenerState::Idle,
            session_id: None,
            deliveries,
        }
    }

    /// Route a host event to its handler
    pub async fn dispatch(&mut self, event: HostEvent) -> Result<Option<MessageOutcome>> {
        tracing::debug!(event = event.name(), host = self.host.name(), "Host event");
        match event {
            HostEvent::Ready => {
                self.on_ready();
                Ok(None)
            }
            HostEvent::ShowConfiguration => {
                self.on_configuration_requested().await?;
                Ok(None)
            }
            HostEvent::WebviewClosed { response } => {
                Ok(self.on_configuration_closed(&response).await)
            }
        }
    }

    /// App start hook; nothing to initialize yet
    pub fn on_ready(&self) {
        tracing::debug!(host = self.host.name(), "Listener ready");
    }

    /// Open the configuration page with the current options attached
    ///
    /// On failure the listener stays idle and the host error is returned.
    pub async fn on_configuration_requested(&mut self) -> Result<()> {
        let url = codec::config_page_url(&self.config.page_url, &self.options)?;
        let session = format!("cfg-{}", uuid::Uuid::new_v4());

        if let Err(e) = self.host.open_url(&url).await {
            tracing::warn!(session = %session, error = %e, "Failed to open config page");
            self.state = ListenerState::Idle;
            return Err(e);
        }

        if self.state == ListenerState::AwaitingWebviewResult {
            tracing::debug!(
                previous = ?self.session_id,
                "Config page reopened before the previous one closed"
            );
        }

        tracing::info!(session = %session, url = %url, "Showing configuration");
        self.session_id = Some(session);
        self.state = ListenerState::AwaitingWebviewResult;
        Ok(())
    }

    /// Handle the webview closing with `response`
    ///
    /// Returns the delivery outcome when a message was sent, `None` when the
    /// page was dismissed or its payload could not be decoded. Always
    /// returns the listener to `Idle`.
    pub async fn on_configuration_closed(&mut self, response: &str) -> Option<MessageOutcome> {
        self.state = ListenerState::Idle;
        let session = self.session_id.take().unwrap_or_default();

        let response = response.trim();
        if response.is_empty() || response == CANCELLED_RESPONSE {
            tracing::info!(session = %session, "Configuration dismissed");
            return None;
        }

        let mut options = match codec::decode_options(response) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(session = %session, error = %e, "Ignoring configuration result");
                return None;
            }
        };
        options.merge_defaults(&self.config.defaults);

        tracing::info!(
            session = %session,
            options = %serde_json::to_string(&options).unwrap_or_default(),
            "Configuration closed"
        );

        let message =
            AppMessage::from_options(&options, self.config.forwarded_keys.as_slice());
        self.options = options;

        let outcome = self.host.send_app_message(&message).await;
        self.deliveries.record(outcome.clone());
        Some(outcome)
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Options most recently returned by the webview (or the defaults)
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn deliveries(&self) -> &DeliveryLog {
        &self.deliveries
    }

    /// Id of the open configuration session, if any
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The last delivery as a `Result`, for callers that want to surface it
    pub fn last_delivery(&self) -> Option<Result<()>> {
        self.deliveries
            .last()
            .map(|record| record.outcome.clone().into_result().map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::host::memory::MemoryHost;
    use crate::types::{OptionValue, TransactionId};

    fn listener() -> ConfigListener<MemoryHost> {
        ConfigListener::new(MemoryHost::new(), ListenerConfig::default())
    }

    fn response(options: &Options) -> String {
        codec::encode_options(options).unwrap()
    }

    #[tokio::test]
    async fn test_starts_idle_with_defaults() {
        let listener = listener();
        assert_eq!(listener.state(), ListenerState::Idle);
        assert_eq!(listener.options(), &Options::with_defaults());
        assert!(listener.session_id().is_none());
        assert!(listener.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_ready_is_noop() {
        let mut listener = listener();
        let outcome = listener.dispatch(HostEvent::Ready).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(listener.state(), ListenerState::Idle);
        assert!(listener.host().opened_urls().await.is_empty());
    }

    #[tokio::test]
    async fn test_configuration_requested_opens_page() {
        let mut listener = listener();
        listener.on_configuration_requested().await.unwrap();

        assert_eq!(listener.state(), ListenerState::AwaitingWebviewResult);
        assert!(listener.session_id().unwrap().starts_with("cfg-"));
        assert_eq!(
            listener.host().opened_urls().await,
            vec!["http://akrs.github.io/moontiles/?%7B%22reversed%22%3A0%7D"]
        );
    }

    #[tokio::test]
    async fn test_configuration_requested_with_empty_options() {
        let config = ListenerConfig {
            defaults: Options::new(),
            ..Default::default()
        };
        let mut listener = ConfigListener::new(MemoryHost::new(), config);
        listener.on_configuration_requested().await.unwrap();

        assert_eq!(
            listener.host().opened_urls().await,
            vec!["http://akrs.github.io/moontiles/?%7B%7D"]
        );
    }

    #[tokio::test]
    async fn test_open_failure_stays_idle() {
        let mut listener = listener();
        listener.host().fail_open_url("phone offline").await;

        let err = listener.on_configuration_requested().await.unwrap_err();
        assert!(matches!(err, ConfigError::Host(_)));
        assert_eq!(listener.state(), ListenerState::Idle);
    }

    #[tokio::test]
    async fn test_closed_sends_narrowed_message() {
        let mut listener = listener();
        listener.on_configuration_requested().await.unwrap();

        let opts = Options::new().with("reversed", 1).with("extraField", "x");
        let outcome = listener
            .on_configuration_closed(&response(&opts))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            MessageOutcome::Delivered {
                transaction_id: TransactionId(1)
            }
        );
        assert_eq!(listener.state(), ListenerState::Idle);
        assert!(listener.session_id().is_none());

        let sent = listener.host().sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.fields(), &Options::new().with("reversed", 1));
        assert_eq!(listener.options().get("extraField"), Some(&OptionValue::from("x")));
    }

    #[tokio::test]
    async fn test_closed_with_malformed_payload_is_noop() {
        let mut listener = listener();
        listener.on_configuration_requested().await.unwrap();

        for bad in [
            "not json",
            "%7Bbroken",
            "%FF%FE",
            "%5B1%2C2%5D",
            "%7B%22reversed%22%3A1%2C%22n%22%3A%22%G1%22%7D",
            "%7B%22reversed%22%3A1%7D%4",
        ] {
            assert!(listener.on_configuration_closed(bad).await.is_none());
            assert_eq!(listener.state(), ListenerState::Idle);
        }

        assert!(listener.host().sent_messages().await.is_empty());
        assert_eq!(listener.options(), &Options::with_defaults());
    }

    #[tokio::test]
    async fn test_closed_dismissed() {
        let mut listener = listener();
        listener.on_configuration_requested().await.unwrap();
        assert!(listener.on_configuration_closed("").await.is_none());
        assert!(listener.on_configuration_closed("CANCELLED").await.is_none());
        assert!(listener.host().sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_recorded_without_retry() {
        let mut listener = listener();
        listener.host().fail_next_send("watch not connected").await;

        let outcome = listener
            .on_configuration_closed(&response(&Options::new().with("reversed", 1)))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            MessageOutcome::Failed {
                transaction_id: TransactionId(1),
                reason: "watch not connected".to_string(),
            }
        );
        assert_eq!(listener.host().sent_messages().await.len(), 1);
        assert_eq!(listener.deliveries().failures().len(), 1);
        assert!(matches!(
            listener.last_delivery(),
            Some(Err(ConfigError::MessageDelivery { .. }))
        ));
    }

    #[tokio::test]
    async fn test_returned_options_used_for_next_request() {
        let mut listener = listener();
        listener
            .on_configuration_closed(&response(&Options::new().with("reversed", 1)))
            .await;
        listener.on_configuration_requested().await.unwrap();

        let urls = listener.host().opened_urls().await;
        assert_eq!(
            urls.last().unwrap(),
            "http://akrs.github.io/moontiles/?%7B%22reversed%22%3A1%7D"
        );
    }

    #[tokio::test]
    async fn test_missing_field_filled_from_defaults() {
        let mut listener = listener();
        listener
            .on_configuration_closed(&response(&Options::new().with("other", 2)))
            .await
            .unwrap();

        let sent = listener.host().sent_messages().await;
        assert_eq!(sent[0].1.fields(), &Options::with_defaults());
    }

    #[tokio::test]
    async fn test_dispatch_full_cycle() {
        let mut listener = listener();
        assert!(listener
            .dispatch(HostEvent::ShowConfiguration)
            .await
            .unwrap()
            .is_none());

        let outcome = listener
            .dispatch(HostEvent::WebviewClosed {
                response: response(&Options::new().with("reversed", 1)),
            })
            .await
            .unwrap();
        assert!(outcome.unwrap().is_delivered());
        assert!(matches!(listener.last_delivery(), Some(Ok(()))));
    }
}
