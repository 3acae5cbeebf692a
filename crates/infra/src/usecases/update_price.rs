//! Change the base price, with an audit row.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use procat_core::{Money, ProductId};

use crate::config::VersionPolicy;
use crate::repository::{PriceHistoryRepository, ProductRepository};
use crate::storage::CommitPlan;
use crate::storage::r#trait::{Committer, ProductQueries};

use super::{CommandError, commit_existing, outbox_mutations};

#[derive(Debug, Clone)]
pub struct UpdatePriceRequest {
    pub product_id: Uuid,
    pub version: u64,
    pub new_price_numerator: i64,
    pub new_price_denominator: i64,
    pub changed_by: String,
    pub changed_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePriceResponse {
    pub product_id: Uuid,
    pub version: u64,
}

/// Interactor: move the base price and commit the product update, the
/// price-history row carrying old and new values, and the
/// `product.price.changed` outbox row atomically.
#[derive(Debug, Clone)]
pub struct UpdatePrice<S> {
    repo: ProductRepository<S>,
    history: PriceHistoryRepository,
    policy: VersionPolicy,
}

impl<S: Committer + ProductQueries> UpdatePrice<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, VersionPolicy::default())
    }

    pub fn with_policy(store: S, policy: VersionPolicy) -> Self {
        Self {
            repo: ProductRepository::new(store),
            history: PriceHistoryRepository::new(),
            policy,
        }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id), err)]
    pub async fn execute(
        &self,
        request: UpdatePriceRequest,
    ) -> Result<UpdatePriceResponse, CommandError> {
        if request.changed_by.trim().is_empty() {
            return Err(CommandError::Validation("changed_by is required".to_string()));
        }
        let new_price = Money::of(request.new_price_numerator, request.new_price_denominator)?;
        if !new_price.is_positive() {
            return Err(CommandError::Validation(
                "new price must be positive".to_string(),
            ));
        }

        let mut product = self
            .repo
            .load(ProductId::from_uuid(request.product_id))
            .await?;
        let old_price = product.base_price().clone();

        let now = Utc::now();
        product.set_base_price(new_price, now)?;

        let mut plan = CommitPlan::new();
        plan.add_opt(self.repo.update_mutation(&product)?);
        plan.add(self.history.insert_mutation(
            product.id_typed(),
            Some(&old_price),
            product.base_price(),
            &request.changed_by,
            request.changed_reason.as_deref(),
            now,
        )?);
        plan.add_all(outbox_mutations(&product)?);

        commit_existing(
            self.repo.store(),
            self.policy,
            request.product_id,
            request.version,
            plan,
        )
        .await?;
        product.clear_events();

        info!(product_id = %request.product_id, changed_by = %request.changed_by, "price updated");
        Ok(UpdatePriceResponse {
            product_id: request.product_id,
            version: request.version + 1,
        })
    }
}
