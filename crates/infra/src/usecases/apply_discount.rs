//! Attach a discount to an active product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use procat_core::{Discount, ProductId};

use crate::config::VersionPolicy;
use crate::repository::ProductRepository;
use crate::storage::CommitPlan;
use crate::storage::r#trait::{Committer, ProductQueries};

use super::{CommandError, commit_existing, outbox_mutations};

#[derive(Debug, Clone)]
pub struct ApplyDiscountRequest {
    pub product_id: Uuid,
    pub version: u64,
    pub percentage: Decimal,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyDiscountResponse {
    pub product_id: Uuid,
    pub version: u64,
}

#[derive(Debug, Clone)]
pub struct ApplyDiscount<S> {
    repo: ProductRepository<S>,
    policy: VersionPolicy,
}

impl<S: Committer + ProductQueries> ApplyDiscount<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, VersionPolicy::default())
    }

    pub fn with_policy(store: S, policy: VersionPolicy) -> Self {
        Self {
            repo: ProductRepository::new(store),
            policy,
        }
    }

    #[instrument(
        skip(self, request),
        fields(product_id = %request.product_id, percentage = %request.percentage),
        err
    )]
    pub async fn execute(
        &self,
        request: ApplyDiscountRequest,
    ) -> Result<ApplyDiscountResponse, CommandError> {
        if request.percentage < Decimal::ZERO || request.percentage > Decimal::from(100) {
            return Err(CommandError::Validation(
                "percentage must be within [0, 100]".to_string(),
            ));
        }
        let start_at = request
            .start_at
            .ok_or_else(|| CommandError::Validation("start_at is required".to_string()))?;
        let end_at = request
            .end_at
            .ok_or_else(|| CommandError::Validation("end_at is required".to_string()))?;

        let discount = Discount::new(request.percentage, start_at, end_at)?;

        let mut product = self
            .repo
            .load(ProductId::from_uuid(request.product_id))
            .await?;
        product.apply_discount(discount, Utc::now())?;

        let mut plan = CommitPlan::new();
        plan.add_opt(self.repo.update_mutation(&product)?);
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

        info!(product_id = %request.product_id, "discount applied");
        Ok(ApplyDiscountResponse {
            product_id: request.product_id,
            version: request.version + 1,
        })
    }
}
