//! In-memory committer.
//!
//! Intended for tests/dev. A single mutex over all three tables makes
//! each applied plan atomic and serializes concurrent version checks the
//! way the database's row locks do in production. Mutations are staged on
//! a copy of the tables and swapped in only when every one of them
//! applied, so a failed plan persists nothing.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::mutation::{Mutation, OutboxInsert, PriceHistoryInsert, ProductInsert, ProductUpdate};
use super::plan::CommitPlan;
use super::r#trait::{
    Committer, OutboxRow, PriceHistoryRow, ProductQueries, ProductRow, StorageError,
};

#[derive(Debug, Default, Clone)]
struct Tables {
    products: HashMap<Uuid, ProductRow>,
    outbox: Vec<OutboxRow>,
    price_history: Vec<PriceHistoryRow>,
}

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct InMemoryCommitter {
    tables: Mutex<Tables>,
}

impl InMemoryCommitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All outbox rows in commit order. Test/diagnostic helper.
    pub fn outbox_rows(&self) -> Vec<OutboxRow> {
        self.lock().outbox.clone()
    }

    /// Audit rows for one product in commit order. Test/diagnostic helper.
    pub fn price_history_rows(&self, product_id: Uuid) -> Vec<PriceHistoryRow> {
        self.lock()
            .price_history
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // Tests observing a poisoned lock already failed elsewhere.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn apply_to(
        tables: &mut Tables,
        mutation: &Mutation,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), StorageError> {
        match mutation {
            Mutation::InsertProduct(insert) => Self::insert_product(tables, insert, now),
            Mutation::UpdateProduct(update) => Self::update_product(tables, update, now),
            Mutation::InsertOutbox(insert) => Self::insert_outbox(tables, insert, now),
            Mutation::InsertPriceHistory(insert) => Self::insert_price_history(tables, insert),
        }
    }

    fn insert_product(
        tables: &mut Tables,
        insert: &ProductInsert,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if tables.products.contains_key(&insert.product_id) {
            return Err(StorageError::database(
                "insert_product",
                format!("duplicate product_id {}", insert.product_id),
            ));
        }
        tables.products.insert(
            insert.product_id,
            ProductRow {
                product_id: insert.product_id,
                name: insert.name.clone(),
                description: insert.description.clone(),
                category: insert.category.clone(),
                base_price_numerator: insert.base_price_numerator,
                base_price_denominator: insert.base_price_denominator,
                discount_percent: insert.discount.as_ref().map(|d| d.percent),
                discount_start_at: insert.discount.as_ref().map(|d| d.start_at),
                discount_end_at: insert.discount.as_ref().map(|d| d.end_at),
                status: insert.status.clone(),
                version: insert.version,
                created_at: now,
                updated_at: now,
                archived_at: insert.archived_at,
            },
        );
        Ok(())
    }

    fn update_product(
        tables: &mut Tables,
        update: &ProductUpdate,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let row = tables
            .products
            .get_mut(&update.product_id)
            .ok_or(StorageError::NotFound)?;

        if let Some(name) = &update.name {
            row.name = name.clone();
        }
        if let Some(description) = &update.description {
            row.description = description.clone();
        }
        if let Some(category) = &update.category {
            row.category = category.clone();
        }
        if let Some((numerator, denominator)) = update.base_price {
            row.base_price_numerator = numerator;
            row.base_price_denominator = denominator;
        }
        if let Some(discount) = &update.discount {
            row.discount_percent = discount.as_ref().map(|d| d.percent);
            row.discount_start_at = discount.as_ref().map(|d| d.start_at);
            row.discount_end_at = discount.as_ref().map(|d| d.end_at);
        }
        if let Some(status) = &update.status {
            row.status = status.clone();
        }
        if let Some(archived_at) = update.archived_at {
            row.archived_at = archived_at;
        }

        row.version += 1;
        row.updated_at = now;
        Ok(())
    }

    fn insert_outbox(
        tables: &mut Tables,
        insert: &OutboxInsert,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if tables.outbox.iter().any(|r| r.event_id == insert.event_id) {
            return Err(StorageError::database(
                "insert_outbox",
                format!("duplicate event_id {}", insert.event_id),
            ));
        }
        tables.outbox.push(OutboxRow {
            event_id: insert.event_id,
            event_type: insert.event_type.clone(),
            aggregate_id: insert.aggregate_id,
            payload: insert.payload.clone(),
            status: insert.status.clone(),
            created_at: now,
            processed_at: None,
            retry_count: insert.retry_count,
            error_message: None,
        });
        Ok(())
    }

    fn insert_price_history(
        tables: &mut Tables,
        insert: &PriceHistoryInsert,
    ) -> Result<(), StorageError> {
        tables.price_history.push(PriceHistoryRow {
            product_id: insert.product_id,
            history_id: insert.history_id,
            old_price_numerator: insert.old_price.map(|(n, _)| n),
            old_price_denominator: insert.old_price.map(|(_, d)| d),
            new_price_numerator: insert.new_price.0,
            new_price_denominator: insert.new_price.1,
            changed_by: insert.changed_by.clone(),
            changed_reason: insert.changed_reason.clone(),
            changed_at: insert.changed_at,
        });
        Ok(())
    }

    fn apply_staged(tables: &mut Tables, plan: &CommitPlan) -> Result<(), StorageError> {
        // One timestamp per plan: the in-memory stand-in for the commit
        // timestamp every row of a transaction shares.
        let now = Utc::now();
        let mut staged = tables.clone();
        for mutation in plan.mutations() {
            Self::apply_to(&mut staged, mutation, now)?;
        }
        *tables = staged;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Committer for InMemoryCommitter {
    async fn apply(&self, plan: CommitPlan) -> Result<(), StorageError> {
        if plan.is_empty() {
            return Ok(());
        }
        let mut tables = self.lock();
        Self::apply_staged(&mut tables, &plan)
    }

    async fn apply_with_version_check(
        &self,
        product_id: Uuid,
        expected_version: u64,
        plan: CommitPlan,
    ) -> Result<(), StorageError> {
        if plan.is_empty() {
            return Ok(());
        }
        let mut tables = self.lock();

        let current = tables
            .products
            .get(&product_id)
            .map(|r| r.version as u64)
            .ok_or(StorageError::NotFound)?;
        if current != expected_version {
            return Err(StorageError::Conflict {
                expected: expected_version,
                found: current,
            });
        }

        Self::apply_staged(&mut tables, &plan)
    }
}

#[async_trait::async_trait]
impl ProductQueries for InMemoryCommitter {
    async fn fetch_product(&self, product_id: Uuid) -> Result<Option<ProductRow>, StorageError> {
        Ok(self.lock().products.get(&product_id).cloned())
    }

    async fn product_exists(&self, product_id: Uuid) -> Result<bool, StorageError> {
        Ok(self.lock().products.contains_key(&product_id))
    }
}
