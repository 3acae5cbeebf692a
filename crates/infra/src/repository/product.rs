//! Product repository: row ↔ aggregate translation and mutation building.

use core::str::FromStr;
use tracing::instrument;

use procat_core::{AggregateRoot, Discount, DomainError, DomainResult, Money, ProductId};
use procat_products::{Field, Product, ProductStatus};

use crate::storage::r#trait::{ProductQueries, ProductRow, StorageError};
use crate::storage::{DiscountColumns, Mutation, ProductInsert, ProductUpdate};

/// Repository over a storage backend.
///
/// Queries execute reads; `insert_mutation`/`update_mutation` are pure and
/// only describe writes. Monetary columns are checked for storage safety
/// here — a value that no longer fits int64 after reduction fails with
/// `MoneyOverflow` instead of being truncated.
#[derive(Debug, Clone)]
pub struct ProductRepository<S> {
    store: S,
}

impl<S> ProductRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ProductQueries> ProductRepository<S> {
    /// Load and rehydrate the aggregate. The returned product has an
    /// empty change set and no pending events.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn load(&self, id: ProductId) -> Result<Product, StorageError> {
        let row = self
            .store
            .fetch_product(*id.as_uuid())
            .await?
            .ok_or(StorageError::NotFound)?;
        decode_row(row)
    }

    pub async fn exists(&self, id: ProductId) -> Result<bool, StorageError> {
        self.store.product_exists(*id.as_uuid()).await
    }
}

impl<S> ProductRepository<S> {
    /// Mutation inserting the full row for a freshly created product.
    pub fn insert_mutation(&self, product: &Product) -> DomainResult<Mutation> {
        let (numerator, denominator) = product.base_price().normalize().storage_parts()?;
        Ok(Mutation::InsertProduct(ProductInsert {
            product_id: *product.id().as_uuid(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            category: product.category().to_string(),
            base_price_numerator: numerator,
            base_price_denominator: denominator,
            discount: product.discount().map(discount_columns),
            status: product.status().as_str().to_string(),
            version: product.version() as i64,
            archived_at: product.archived_at(),
        }))
    }

    /// Mutation updating exactly the dirty columns, or `None` when the
    /// change set is empty. Applying it also bumps the version and
    /// refreshes `updated_at`.
    pub fn update_mutation(&self, product: &Product) -> DomainResult<Option<Mutation>> {
        let change_set = product.change_set();
        if !change_set.has_changes() {
            return Ok(None);
        }

        let mut update = ProductUpdate::for_product(*product.id().as_uuid());
        if change_set.is_dirty(Field::Name) {
            update.name = Some(product.name().to_string());
        }
        if change_set.is_dirty(Field::Description) {
            update.description = Some(product.description().to_string());
        }
        if change_set.is_dirty(Field::Category) {
            update.category = Some(product.category().to_string());
        }
        if change_set.is_dirty(Field::BasePrice) {
            update.base_price = Some(product.base_price().normalize().storage_parts()?);
        }
        if change_set.is_dirty(Field::Discount) {
            update.discount = Some(product.discount().map(discount_columns));
        }
        if change_set.is_dirty(Field::Status) {
            update.status = Some(product.status().as_str().to_string());
        }
        if change_set.is_dirty(Field::ArchivedAt) {
            update.archived_at = Some(product.archived_at());
        }

        Ok(Some(Mutation::UpdateProduct(update)))
    }
}

fn discount_columns(discount: &Discount) -> DiscountColumns {
    DiscountColumns {
        percent: discount.percentage(),
        start_at: discount.start_at(),
        end_at: discount.end_at(),
    }
}

/// Rebuild the aggregate from its row.
///
/// Rows were validated on the way in, so a decode failure means the
/// stored data is corrupt; it surfaces as an opaque storage error rather
/// than a domain one.
pub(crate) fn decode_row(row: ProductRow) -> Result<Product, StorageError> {
    let decode = |e: DomainError| StorageError::database("decode_product_row", e.to_string());

    let base_price = Money::of(row.base_price_numerator, row.base_price_denominator)
        .map_err(decode)?;
    let status = ProductStatus::from_str(&row.status).map_err(decode)?;
    let discount = match (row.discount_percent, row.discount_start_at, row.discount_end_at) {
        (Some(percent), Some(start_at), Some(end_at)) => {
            Some(Discount::new(percent, start_at, end_at).map_err(decode)?)
        }
        (None, None, None) => None,
        _ => {
            return Err(StorageError::database(
                "decode_product_row",
                "discount columns are partially populated",
            ));
        }
    };

    Ok(Product::reconstruct(
        ProductId::from_uuid(row.product_id),
        row.name,
        row.description,
        row.category,
        base_price,
        discount,
        status,
        row.version as u64,
        row.created_at,
        row.updated_at,
        row.archived_at,
    ))
}
