//! Read-model boundary: display projection of a product row.
//!
//! Listed here because the write path must keep its invariants consistent
//! with what this projection assumes (an archived product has no discount,
//! a stored discount always has all three columns). Query pagination and
//! listing endpoints live outside the core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use procat_core::Money;
use procat_products::ProductStatus;

use crate::repository::product::decode_row;
use crate::storage::r#trait::{ProductQueries, StorageError};

/// Display DTO with the effective price precomputed at projection time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub effective_price: Money,
    pub discount_percent: Option<Decimal>,
    pub status: ProductStatus,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Projects product rows into display DTOs.
#[derive(Debug, Clone)]
pub struct ProductReadModel<S> {
    store: S,
}

impl<S: ProductQueries> ProductReadModel<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Project one product, applying any discount valid at `now`.
    pub async fn get(
        &self,
        product_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ProductView>, StorageError> {
        let Some(row) = self.store.fetch_product(product_id).await? else {
            return Ok(None);
        };
        let product = decode_row(row)?;

        let discount_percent = product
            .discount()
            .filter(|d| d.is_valid_at(now))
            .map(|d| d.percentage());

        Ok(Some(ProductView {
            product_id,
            name: product.name().to_string(),
            description: product.description().to_string(),
            category: product.category().to_string(),
            base_price: product.base_price().clone(),
            effective_price: product.effective_price(now),
            discount_percent,
            status: product.status(),
            version: procat_core::AggregateRoot::version(&product),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
            archived_at: product.archived_at(),
        }))
    }
}
