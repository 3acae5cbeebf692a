//! Typed domain events recorded by product commands.
//!
//! Event-type strings are the publication contract: lowercase, dotted,
//! stable. Monetary payload fields serialize as `{numerator, denominator}`
//! pairs via the `Money` wire format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use procat_core::{Money, ProductId};
use procat_events::DomainEvent;

use crate::product::ProductStatus;

/// Event: a product came into existence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub status: ProductStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: one or more descriptive fields changed.
///
/// Carries the final values after the whole setter batch; one event per
/// `mark_updated` call no matter how many setters preceded it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: the base price moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasePriceChanged {
    pub product_id: ProductId,
    pub old_price: Money,
    pub new_price: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a discount was attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountApplied {
    pub product_id: ProductId,
    pub percentage: Decimal,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub applied_at: DateTime<Utc>,
}

/// Event: the discount was detached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRemoved {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: the product became sellable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductActivated {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: the product was taken off sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDeactivated {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: the product reached its terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductArchived {
    pub product_id: ProductId,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
    BasePriceChanged(BasePriceChanged),
    DiscountApplied(DiscountApplied),
    DiscountRemoved(DiscountRemoved),
    ProductActivated(ProductActivated),
    ProductDeactivated(ProductDeactivated),
    ProductArchived(ProductArchived),
}

impl ProductEvent {
    /// The flat JSON body written to the outbox `payload` column.
    ///
    /// The event type lives in its own column, so the payload is the bare
    /// field set of the variant, not a tagged wrapper.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            ProductEvent::ProductCreated(e) => serde_json::to_value(e),
            ProductEvent::ProductUpdated(e) => serde_json::to_value(e),
            ProductEvent::BasePriceChanged(e) => serde_json::to_value(e),
            ProductEvent::DiscountApplied(e) => serde_json::to_value(e),
            ProductEvent::DiscountRemoved(e) => serde_json::to_value(e),
            ProductEvent::ProductActivated(e) => serde_json::to_value(e),
            ProductEvent::ProductDeactivated(e) => serde_json::to_value(e),
            ProductEvent::ProductArchived(e) => serde_json::to_value(e),
        }
    }
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "product.created",
            ProductEvent::ProductUpdated(_) => "product.updated",
            ProductEvent::BasePriceChanged(_) => "product.price.changed",
            ProductEvent::DiscountApplied(_) => "product.discount.applied",
            ProductEvent::DiscountRemoved(_) => "product.discount.removed",
            ProductEvent::ProductActivated(_) => "product.activated",
            ProductEvent::ProductDeactivated(_) => "product.deactivated",
            ProductEvent::ProductArchived(_) => "product.archived",
        }
    }

    fn aggregate_id(&self) -> Uuid {
        let product_id = match self {
            ProductEvent::ProductCreated(e) => e.product_id,
            ProductEvent::ProductUpdated(e) => e.product_id,
            ProductEvent::BasePriceChanged(e) => e.product_id,
            ProductEvent::DiscountApplied(e) => e.product_id,
            ProductEvent::DiscountRemoved(e) => e.product_id,
            ProductEvent::ProductActivated(e) => e.product_id,
            ProductEvent::ProductDeactivated(e) => e.product_id,
            ProductEvent::ProductArchived(e) => e.product_id,
        };
        *product_id.as_uuid()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::ProductUpdated(e) => e.occurred_at,
            ProductEvent::BasePriceChanged(e) => e.occurred_at,
            ProductEvent::DiscountApplied(e) => e.applied_at,
            ProductEvent::DiscountRemoved(e) => e.occurred_at,
            ProductEvent::ProductActivated(e) => e.occurred_at,
            ProductEvent::ProductDeactivated(e) => e.occurred_at,
            ProductEvent::ProductArchived(e) => e.archived_at,
        }
    }
}
