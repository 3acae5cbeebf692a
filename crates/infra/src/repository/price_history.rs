//! Price-history repository: append-only audit rows for price changes.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use procat_core::{DomainResult, Money, ProductId};

use crate::storage::{Mutation, PriceHistoryInsert};

/// Builds insert mutations for the price audit trail.
///
/// Both prices are normalized before their numerator/denominator pairs
/// are extracted; a value that no longer fits int64 fails the build with
/// `MoneyOverflow`, which aborts the whole commit — the audit row is not
/// droppable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceHistoryRepository;

impl PriceHistoryRepository {
    pub fn new() -> Self {
        Self
    }

    /// Audit row for one price transition. `old_price` is `None` only for
    /// the record written at product creation.
    pub fn insert_mutation(
        &self,
        product_id: ProductId,
        old_price: Option<&Money>,
        new_price: &Money,
        changed_by: &str,
        changed_reason: Option<&str>,
        changed_at: DateTime<Utc>,
    ) -> DomainResult<Mutation> {
        let old_price = old_price
            .map(|p| p.normalize().storage_parts())
            .transpose()?;
        let new_price = new_price.normalize().storage_parts()?;

        Ok(Mutation::InsertPriceHistory(PriceHistoryInsert {
            history_id: Uuid::now_v7(),
            product_id: *product_id.as_uuid(),
            old_price,
            new_price,
            changed_by: changed_by.to_string(),
            changed_reason: changed_reason.map(str::to_string),
            changed_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procat_core::DomainError;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn initial_record_has_no_old_price() {
        let mutation = PriceHistoryRepository::new()
            .insert_mutation(
                ProductId::new(),
                None,
                &Money::of(5_000, 100).unwrap(),
                "system",
                Some("Initial price"),
                ts("2025-01-01T00:00:00Z"),
            )
            .unwrap();
        match mutation {
            Mutation::InsertPriceHistory(insert) => {
                assert!(insert.old_price.is_none());
                assert_eq!(insert.new_price, (50, 1));
                assert_eq!(insert.changed_by, "system");
                assert_eq!(insert.changed_reason.as_deref(), Some("Initial price"));
            }
            other => panic!("expected InsertPriceHistory, got {other:?}"),
        }
    }

    #[test]
    fn transition_record_normalizes_both_prices() {
        let mutation = PriceHistoryRepository::new()
            .insert_mutation(
                ProductId::new(),
                Some(&Money::of(15_000, 100).unwrap()),
                &Money::of(20_000, 100).unwrap(),
                "alice",
                Some("quarterly adjustment"),
                ts("2025-04-01T00:00:00Z"),
            )
            .unwrap();
        match mutation {
            Mutation::InsertPriceHistory(insert) => {
                assert_eq!(insert.old_price, Some((150, 1)));
                assert_eq!(insert.new_price, (200, 1));
            }
            other => panic!("expected InsertPriceHistory, got {other:?}"),
        }
    }

    #[test]
    fn unstorable_price_fails_with_money_overflow() {
        let huge = Money::of(i64::MAX, 3)
            .unwrap()
            .mul(&Money::of(9, 1).unwrap());
        let err = PriceHistoryRepository::new()
            .insert_mutation(
                ProductId::new(),
                None,
                &huge,
                "system",
                None,
                ts("2025-01-01T00:00:00Z"),
            )
            .unwrap_err();
        assert_eq!(err, DomainError::MoneyOverflow);
    }
}
