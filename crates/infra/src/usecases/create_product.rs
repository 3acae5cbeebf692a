//! Create a product.

use chrono::Utc;
use tracing::{info, instrument};

use procat_core::{Money, ProductId};
use procat_products::Product;

use crate::repository::{PriceHistoryRepository, ProductRepository};
use crate::storage::CommitPlan;
use crate::storage::r#trait::{Committer, ProductQueries};

use super::{CommandError, outbox_mutations};

/// Actor recorded on the initial price-history row.
const SYSTEM_ACTOR: &str = "system";
const INITIAL_PRICE_REASON: &str = "Initial price";

#[derive(Debug, Clone)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductResponse {
    pub product_id: ProductId,
    pub version: u64,
}

/// Interactor: construct the aggregate, then commit its insert, the
/// initial price-history row, and the `product.created` outbox row in
/// one transaction. No version check — there is no prior version.
#[derive(Debug, Clone)]
pub struct CreateProduct<S> {
    repo: ProductRepository<S>,
    history: PriceHistoryRepository,
}

impl<S: Committer + ProductQueries> CreateProduct<S> {
    pub fn new(store: S) -> Self {
        Self {
            repo: ProductRepository::new(store),
            history: PriceHistoryRepository::new(),
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn execute(
        &self,
        request: CreateProductRequest,
    ) -> Result<CreateProductResponse, CommandError> {
        if request.name.trim().is_empty() {
            return Err(CommandError::Validation("name is required".to_string()));
        }
        if request.category.trim().is_empty() {
            return Err(CommandError::Validation("category is required".to_string()));
        }
        let base_price = Money::of(request.base_price_numerator, request.base_price_denominator)?;

        let now = Utc::now();
        let product_id = ProductId::new();
        let mut product = Product::new(
            product_id,
            request.name,
            request.description,
            request.category,
            base_price,
            now,
        )?;

        let mut plan = CommitPlan::new();
        plan.add(self.repo.insert_mutation(&product)?);
        plan.add(self.history.insert_mutation(
            product_id,
            None,
            product.base_price(),
            SYSTEM_ACTOR,
            Some(INITIAL_PRICE_REASON),
            now,
        )?);
        plan.add_all(outbox_mutations(&product)?);

        self.repo.store().apply(plan).await?;
        product.clear_events();

        info!(product_id = %product_id, "product created");
        Ok(CreateProductResponse {
            product_id,
            version: 0,
        })
    }
}
