//! Outbox repository: wraps domain events into persistable outbox rows.

use uuid::Uuid;

use procat_events::{DomainEvent, OutboxEvent};
use procat_products::ProductEvent;

use crate::storage::{Mutation, OutboxInsert};

/// Enriches domain events and builds their insert mutations.
///
/// Rows are inserted in the same transaction as the aggregate mutation —
/// the outbox pattern's whole point: there is no window where the state
/// changed but the event is lost. The row's `created_at` comes from the
/// storage layer's commit timestamp, not from here.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutboxRepository;

impl OutboxRepository {
    pub fn new() -> Self {
        Self
    }

    /// Wrap a domain event into an outbox row: fresh event id, the
    /// event's type string and aggregate id, flat JSON payload, status
    /// `pending`.
    pub fn enrich(&self, event: &ProductEvent) -> Result<OutboxEvent, serde_json::Error> {
        let payload = event.payload()?;
        Ok(OutboxEvent::pending(
            Uuid::now_v7(),
            event.event_type(),
            event.aggregate_id(),
            payload,
        ))
    }

    pub fn insert_mutation(&self, event: &OutboxEvent) -> Mutation {
        Mutation::InsertOutbox(OutboxInsert {
            event_id: event.event_id(),
            event_type: event.event_type().to_string(),
            aggregate_id: event.aggregate_id(),
            payload: event.payload().clone(),
            status: event.status().as_str().to_string(),
            retry_count: event.retry_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use procat_core::ProductId;
    use procat_events::OutboxStatus;
    use procat_products::ProductActivated;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn enrich_copies_identity_and_defaults_to_pending() {
        let product_id = ProductId::new();
        let event = ProductEvent::ProductActivated(ProductActivated {
            product_id,
            occurred_at: ts("2025-03-01T00:00:00Z"),
        });

        let enriched = OutboxRepository::new().enrich(&event).unwrap();
        assert_eq!(enriched.event_type(), "product.activated");
        assert_eq!(enriched.aggregate_id(), *product_id.as_uuid());
        assert_eq!(enriched.status(), OutboxStatus::Pending);
        assert_eq!(enriched.retry_count(), 0);
        assert!(enriched.payload()["occurred_at"].is_string());
    }

    #[test]
    fn enrich_assigns_a_fresh_event_id_each_time() {
        let event = ProductEvent::ProductActivated(ProductActivated {
            product_id: ProductId::new(),
            occurred_at: ts("2025-03-01T00:00:00Z"),
        });
        let repo = OutboxRepository::new();
        let a = repo.enrich(&event).unwrap();
        let b = repo.enrich(&event).unwrap();
        assert_ne!(a.event_id(), b.event_id());
    }

    #[test]
    fn insert_mutation_mirrors_the_enriched_row() {
        let event = ProductEvent::ProductActivated(ProductActivated {
            product_id: ProductId::new(),
            occurred_at: ts("2025-03-01T00:00:00Z"),
        });
        let repo = OutboxRepository::new();
        let enriched = repo.enrich(&event).unwrap();
        match repo.insert_mutation(&enriched) {
            Mutation::InsertOutbox(insert) => {
                assert_eq!(insert.event_id, enriched.event_id());
                assert_eq!(insert.event_type, "product.activated");
                assert_eq!(insert.status, "pending");
                assert_eq!(insert.retry_count, 0);
            }
            other => panic!("expected InsertOutbox, got {other:?}"),
        }
    }
}
