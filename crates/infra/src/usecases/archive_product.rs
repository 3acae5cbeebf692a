//! Archive a product (terminal soft delete).

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use procat_core::ProductId;

use crate::config::VersionPolicy;
use crate::repository::ProductRepository;
use crate::storage::CommitPlan;
use crate::storage::r#trait::{Committer, ProductQueries};

use super::{CommandError, commit_existing, outbox_mutations};

#[derive(Debug, Clone)]
pub struct ArchiveProductRequest {
    pub product_id: Uuid,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveProductResponse {
    pub product_id: Uuid,
    pub version: u64,
    pub archived_at: DateTime<Utc>,
}

/// Interactor: archive the product. If a discount is attached the
/// aggregate removes it first, so the plan carries the
/// `product.discount.removed` outbox row ahead of `product.archived`.
#[derive(Debug, Clone)]
pub struct ArchiveProduct<S> {
    repo: ProductRepository<S>,
    policy: VersionPolicy,
}

impl<S: Committer + ProductQueries> ArchiveProduct<S> {
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
        request: ArchiveProductRequest,
    ) -> Result<ArchiveProductResponse, CommandError> {
        let mut product = self
            .repo
            .load(ProductId::from_uuid(request.product_id))
            .await?;

        let now = Utc::now();
        product.archive(now)?;

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

        info!(product_id = %request.product_id, "product archived");
        Ok(ArchiveProductResponse {
            product_id: request.product_id,
            version: request.version + 1,
            archived_at: now,
        })
    }
}
