//! Update the descriptive fields of a product.

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
pub struct UpdateProductRequest {
    pub product_id: Uuid,
    pub version: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProductResponse {
    pub product_id: Uuid,
    pub version: u64,
}

/// Interactor: apply the provided setters, coalesce them into a single
/// `product.updated` event via `mark_updated`, and commit under the
/// optimistic lock.
#[derive(Debug, Clone)]
pub struct UpdateProduct<S> {
    repo: ProductRepository<S>,
    policy: VersionPolicy,
}

impl<S: Committer + ProductQueries> UpdateProduct<S> {
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
        request: UpdateProductRequest,
    ) -> Result<UpdateProductResponse, CommandError> {
        if request.name.is_none() && request.description.is_none() && request.category.is_none() {
            return Err(CommandError::Validation(
                "at least one of name, description, category must be provided".to_string(),
            ));
        }

        let mut product = self
            .repo
            .load(ProductId::from_uuid(request.product_id))
            .await?;

        if let Some(name) = &request.name {
            product.set_name(name.clone())?;
        }
        if let Some(description) = &request.description {
            product.set_description(description.clone())?;
        }
        if let Some(category) = &request.category {
            product.set_category(category.clone())?;
        }
        product.mark_updated(Utc::now())?;

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

        info!(product_id = %request.product_id, "product updated");
        Ok(UpdateProductResponse {
            product_id: request.product_id,
            version: request.version + 1,
        })
    }
}
