//! Delivery log — outcomes of app messages sent after configuration
//!
//! Sends are never retried. The log only remembers what happened so the
//! caller can surface the last failure or inspect recent history.

use crate::types::MessageOutcome;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Default number of records kept
pub const DEFAULT_CAPACITY: usize = 100;

/// A delivery outcome with the time it was recorded
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub outcome: MessageOutcome,
    pub recorded_at: DateTime<Utc>,
}

/// Bounded in-memory log of delivery outcomes
///
/// Oldest records are evicted once `max_records` is exceeded. A capacity of
/// zero keeps everything.
#[derive(Debug)]
pub struct DeliveryLog {
    records: VecDeque<DeliveryRecord>,
    max_records: usize,
}

impl DeliveryLog {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max_records,
        }
    }

    /// Record an outcome, logging it at a level matching the result
    pub fn record(&mut self, outcome: MessageOutcome) {
        match &outcome {
            MessageOutcome::Delivered { transaction_id } => {
                tracing::info!(transaction = %transaction_id, "App message delivered");
            }
            MessageOutcome::Failed {
                transaction_id,
                reason,
            } => {
                tracing::warn!(
                    transaction = %transaction_id,
                    reason = %reason,
                    "App message delivery failed"
                );
            }
        }

        self.records.push_back(DeliveryRecord {
            outcome,
            recorded_at: Utc::now(),
        });

        if self.max_records > 0 {
            while self.records.len() > self.max_records {
                self.records.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record
    pub fn last(&self) -> Option<&DeliveryRecord> {
        self.records.back()
    }

    /// Up to `limit` records, newest first
    pub fn recent(&self, limit: usize) -> Vec<DeliveryRecord> {
        self.records.iter().rev().take(limit).cloned().collect()
    }

    /// Failed deliveries, oldest first
    pub fn failures(&self) -> Vec<DeliveryRecord> {
        self.records
            .iter()
            .filter(|r| !r.outcome.is_delivered())
            .cloned()
            .collect()
    }
}

impl Default for DeliveryLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
