//! Interaction audit log
//!
//! Every interpreted message is recorded after the engine returns. The
//! in-memory log keeps the most recent entries; a durable store can be
//! plugged in behind the same trait.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trade_query_core::{InterpretResponse, Language, Outcome, QueryIntent};

/// One interpreted message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub language_hint: Option<String>,
    pub resolved_language: Language,
    pub matched_intent: QueryIntent,
    pub outcome: Outcome,
    pub latency_ms: u64,
    pub response: String,
}

impl InteractionRecord {
    pub fn new(
        message: &str,
        language_hint: Option<&str>,
        response: &InterpretResponse,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            message: message.to_string(),
            language_hint: language_hint.map(str::to_string),
            resolved_language: response.resolved_language,
            matched_intent: response.matched_intent,
            outcome: response.outcome,
            latency_ms,
            response: response.text.clone(),
        }
    }
}

/// Audit sink for interpreted messages
#[async_trait]
pub trait InteractionLog: Send + Sync {
    async fn record(&self, entry: InteractionRecord);

    /// Most recent entries, newest first
    async fn recent(&self, limit: usize) -> Vec<InteractionRecord>;
}

/// Bounded in-memory log; the oldest entry is dropped when full
pub struct InMemoryInteractionLog {
    entries: Mutex<VecDeque<InteractionRecord>>,
    capacity: usize,
}

impl InMemoryInteractionLog {
    /// A zero capacity records nothing
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl InteractionLog for InMemoryInteractionLog {
    async fn record(&self, entry: InteractionRecord) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        tracing::debug!(id = %entry.id, outcome = ?entry.outcome, "Interaction recorded");
        entries.push_back(entry);
    }

    async fn recent(&self, limit: usize) -> Vec<InteractionRecord> {
        self.entries
            .lock()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }
}
