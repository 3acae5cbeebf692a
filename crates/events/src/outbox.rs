use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Delivery state of an outbox row.
///
/// The write path only ever inserts `Pending` rows; the drainer worker
/// advances them through `Processing` to `Completed` or `Failed`.
/// Retention is an external batch job's contract: completed rows are
/// purged after 30 days, failed rows kept 90 days for debugging, pending
/// rows never auto-purged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Processing => "processing",
            OutboxStatus::Completed => "completed",
            OutboxStatus::Failed => "failed",
        }
    }
}

impl core::str::FromStr for OutboxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OutboxStatus::Pending),
            "processing" => Ok(OutboxStatus::Processing),
            "completed" => Ok(OutboxStatus::Completed),
            "failed" => Ok(OutboxStatus::Failed),
            other => Err(format!("unknown outbox status '{other}'")),
        }
    }
}

/// A domain event enriched with the metadata the outbox table persists.
///
/// This is the unit of persistence for event publication: the row is
/// inserted in the same transaction as the aggregate mutation, so there is
/// no window in which state changed but the event was lost. `created_at`
/// is deliberately absent — the storage layer stamps it with the commit
/// timestamp so rows written together order together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxEvent {
    event_id: Uuid,
    event_type: String,
    aggregate_id: Uuid,
    payload: JsonValue,
    status: OutboxStatus,
    retry_count: i32,
    processed_at: Option<chrono::DateTime<chrono::Utc>>,
    error_message: Option<String>,
}

impl OutboxEvent {
    /// A freshly enriched event awaiting its first delivery attempt.
    pub fn pending(
        event_id: Uuid,
        event_type: impl Into<String>,
        aggregate_id: Uuid,
        payload: JsonValue,
    ) -> Self {
        Self {
            event_id,
            event_type: event_type.into(),
            aggregate_id,
            payload,
            status: OutboxStatus::Pending,
            retry_count: 0,
            processed_at: None,
            error_message: None,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn aggregate_id(&self) -> Uuid {
        self.aggregate_id
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    pub fn status(&self) -> OutboxStatus {
        self.status
    }

    pub fn retry_count(&self) -> i32 {
        self.retry_count
    }

    pub fn processed_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.processed_at
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}
