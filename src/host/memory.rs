//! In-memory host runtime
//!
//! Records every opened URL and sent message instead of talking to a
//! phone. Sends can be scripted to fail so nack handling is testable.

use crate::error::{ConfigError, Result};
use crate::host::HostRuntime;
use crate::types::{AppMessage, MessageOutcome, TransactionId};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

/// In-memory host for tests and single-process use
#[derive(Default)]
pub struct MemoryHost {
    opened: RwLock<Vec<String>>,
    sent: RwLock<Vec<(TransactionId, AppMessage)>>,
    send_failures: RwLock<VecDeque<String>>,
    open_failure: RwLock<Option<String>>,
    next_transaction: AtomicU32,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs passed to `open_url`, oldest first
    pub async fn opened_urls(&self) -> Vec<String> {
        self.opened.read().await.clone()
    }

    /// Messages passed to `send_app_message` with their transaction ids
    pub async fn sent_messages(&self) -> Vec<(TransactionId, AppMessage)> {
        self.sent.read().await.clone()
    }

    /// Make the next send fail with `reason`; queued failures apply in order
    pub async fn fail_next_send(&self, reason: impl Into<String>) {
        self.send_failures.write().await.push_back(reason.into());
    }

    /// Make every subsequent `open_url` fail with `reason`
    pub async fn fail_open_url(&self, reason: impl Into<String>) {
        *self.open_failure.write().await = Some(reason.into());
    }
}

#[async_trait]
impl HostRuntime for MemoryHost {
    async fn open_url(&self, url: &str) -> Result<()> {
        if let Some(reason) = self.open_failure.read().await.as_ref() {
            return Err(ConfigError::Host(format!(
                "Failed to open {}: {}",
                url, reason
            )));
        }
        self.opened.write().await.push(url.to_string());
        Ok(())
    }

    async fn send_app_message(&self, message: &AppMessage) -> MessageOutcome {
        let transaction_id = TransactionId(
            self.next_transaction
                .fetch_add(1, Ordering::SeqCst)
                .wrapping_add(1),
        );
        self.sent
            .write()
            .await
            .push((transaction_id, message.clone()));

        match self.send_failures.write().await.pop_front() {
            Some(reason) => MessageOutcome::Failed {
                transaction_id,
                reason,
            },
            None => MessageOutcome::Delivered { transaction_id },
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}
