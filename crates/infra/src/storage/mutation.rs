//! Opaque storage mutations built by repositories and applied by a
//! committer.
//!
//! A mutation carries fully-resolved column values and no connection or
//! statement handles, so repositories stay pure mutation builders: they
//! decide *what* to write, a committer decides *how* and *when*. This is
//! what lets one use case combine product, outbox, and price-history
//! writes in a single transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// The discount column triple on the product row.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountColumns {
    pub percent: Decimal,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Full column set for a new product row.
///
/// `created_at`/`updated_at` are absent on purpose: the storage layer
/// stamps them with its commit timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInsert {
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
    pub discount: Option<DiscountColumns>,
    pub status: String,
    pub version: i64,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Partial update of a product row: only dirty columns are present.
///
/// Every applied update also bumps `version` by one and refreshes
/// `updated_at`, regardless of which columns are listed. The nested
/// `Option` on `discount` distinguishes "leave alone" (`None`) from
/// "clear the columns" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub product_id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub base_price: Option<(i64, i64)>,
    pub discount: Option<Option<DiscountColumns>>,
    pub status: Option<String>,
    pub archived_at: Option<Option<DateTime<Utc>>>,
}

impl ProductUpdate {
    pub fn for_product(product_id: Uuid) -> Self {
        Self {
            product_id,
            ..Self::default()
        }
    }

    /// True when no column beyond the implicit version/updated_at bump
    /// would be touched.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.base_price.is_none()
            && self.discount.is_none()
            && self.status.is_none()
            && self.archived_at.is_none()
    }
}

/// A pending outbox row. `created_at` is stamped at commit time.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxInsert {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_id: Uuid,
    pub payload: JsonValue,
    pub status: String,
    pub retry_count: i32,
}

/// An append-only audit row for a price transition.
///
/// `old_price` is absent only for the record written at product creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistoryInsert {
    pub history_id: Uuid,
    pub product_id: Uuid,
    pub old_price: Option<(i64, i64)>,
    pub new_price: (i64, i64),
    pub changed_by: String,
    pub changed_reason: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// A single storage write, opaque to everything above the repositories.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    InsertProduct(ProductInsert),
    UpdateProduct(ProductUpdate),
    InsertOutbox(OutboxInsert),
    InsertPriceHistory(PriceHistoryInsert),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_update_emptiness() {
        let update = ProductUpdate::for_product(Uuid::now_v7());
        assert!(update.is_empty());

        let mut update = ProductUpdate::for_product(Uuid::now_v7());
        update.name = Some("Widget".to_string());
        assert!(!update.is_empty());

        // Clearing the discount is a real change.
        let mut update = ProductUpdate::for_product(Uuid::now_v7());
        update.discount = Some(None);
        assert!(!update.is_empty());
    }
}
