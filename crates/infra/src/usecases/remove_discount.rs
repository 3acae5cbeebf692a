//! Detach the discount from a product.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use procat_core::ProductId;

use crate::config::VersionPolicy;
use crate::repository::ProductRepository;
use crate::storage::CommitPlan;
use crate::storage::r#trait::{Committer, ProductQueries};

use super::{CommandError, commit_existing, outbox_mutations};

#[derive(Debug, Clone)]
pub struct RemoveDiscountRequest {
    pub product_id: Uuid,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveDiscountResponse {
    pub product_id: Uuid,
    pub version: u64,
}

/// Interactor: remove the discount if one is attached. Removing from a
/// product without a discount yields an empty plan, which commits as a
/// no-op and leaves the version untouched.
#[derive(Debug, Clone)]
pub struct RemoveDiscount<S> {
    repo: ProductRepository<S>,
    policy: VersionPolicy,
}

impl<S: Committer + ProductQueries> RemoveDiscount<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, VersionPolicy::default())
    }

    pub fn with_policy(store: S, policy: VersionPolicy) -> Self {
        Self {
            repo: ProductRepository::new(store),
            policy,
        }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id), err)]
    pub async fn execute(
        &self,
        request: RemoveDiscountRequest,
    ) -> Result<RemoveDiscountResponse, CommandError> {
        let mut product = self
            .repo
            .load(ProductId::from_uuid(request.product_id))
            .await?;
        product.remove_discount(Utc::now())?;

        let mut plan = CommitPlan::new();
        plan.add_opt(self.repo.update_mutation(&product)?);
        plan.add_all(outbox_mutations(&product)?);
        let committed = !plan.is_empty();

        commit_existing(
            self.repo.store(),
            self.policy,
            request.product_id,
            request.version,
            plan,
        )
        .await?;
        product.clear_events();

        info!(product_id = %request.product_id, committed, "discount removed");
        Ok(RemoveDiscountResponse {
            product_id: request.product_id,
            version: if committed {
                request.version + 1
            } else {
                request.version
            },
        })
    }
}
