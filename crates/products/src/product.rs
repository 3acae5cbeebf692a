use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use procat_core::{AggregateRoot, Discount, DomainError, DomainResult, Money, ProductId};

use crate::changeset::{ChangeSet, Field};
use crate::events::{
    BasePriceChanged, DiscountApplied, DiscountRemoved, ProductActivated, ProductArchived,
    ProductCreated, ProductDeactivated, ProductEvent, ProductUpdated,
};

/// Product status lifecycle.
///
/// `Inactive` is the initial state, `Archived` the terminal one. Archiving
/// is a soft delete; nothing ever leaves `Archived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Inactive,
    Active,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Inactive => "inactive",
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }
}

impl core::str::FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inactive" => Ok(ProductStatus::Inactive),
            "active" => Ok(ProductStatus::Active),
            "archived" => Ok(ProductStatus::Archived),
            other => Err(DomainError::InvalidId(format!(
                "unknown product status '{other}'"
            ))),
        }
    }
}

/// Aggregate root: Product.
///
/// All mutations go through command methods. Each command validates its
/// preconditions first and only then mutates, so a rejected command leaves
/// the aggregate untouched — no partial state, no dirty marks, no events.
/// Commands mark exactly the fields they touch in the change set and
/// record the events they stand for; the use-case layer persists both in
/// one transaction and clears the pending events only after the commit
/// succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category: String,
    base_price: Money,
    discount: Option<Discount>,
    status: ProductStatus,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,

    change_set: ChangeSet,
    pending_events: Vec<ProductEvent>,
}

impl Product {
    /// Factory: a freshly created, not-yet-persisted product.
    ///
    /// Starts `Inactive` at version 0 with every field dirty, and records
    /// `product.created`. The row materializes in storage only when the
    /// use case commits.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        base_price: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let description = description.into();
        let category = category.into();

        validate_name(&name)?;
        validate_category(&category)?;
        validate_price(&base_price)?;

        let mut product = Self {
            id,
            name,
            description,
            category,
            base_price,
            discount: None,
            status: ProductStatus::Inactive,
            version: 0,
            created_at: now,
            updated_at: now,
            archived_at: None,
            change_set: ChangeSet::new(),
            pending_events: Vec::new(),
        };

        for field in [
            Field::Name,
            Field::Description,
            Field::Category,
            Field::BasePrice,
            Field::Discount,
            Field::Status,
            Field::ArchivedAt,
        ] {
            product.change_set.mark_dirty(field);
        }

        product.record(ProductEvent::ProductCreated(ProductCreated {
            product_id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            base_price: product.base_price.clone(),
            status: product.status,
            occurred_at: now,
        }));

        Ok(product)
    }

    /// Rehydrate from storage row values.
    ///
    /// Emits no events and starts with an empty change set.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: ProductId,
        name: String,
        description: String,
        category: String,
        base_price: Money,
        discount: Option<Discount>,
        status: ProductStatus,
        version: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        archived_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            base_price,
            discount,
            status,
            version,
            created_at,
            updated_at,
            archived_at,
            change_set: ChangeSet::new(),
            pending_events: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn base_price(&self) -> &Money {
        &self.base_price
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    pub fn change_set(&self) -> &ChangeSet {
        &self.change_set
    }

    /// Events recorded since load and not yet persisted.
    pub fn pending_events(&self) -> &[ProductEvent] {
        &self.pending_events
    }

    /// Forget recorded events.
    ///
    /// Call only after a successful commit: clearing first and committing
    /// second loses the events forever if the commit fails.
    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }

    /// The price a buyer pays at `now`: base price minus any discount
    /// whose validity window covers `now`.
    pub fn effective_price(&self, now: DateTime<Utc>) -> Money {
        match &self.discount {
            Some(d) if d.is_valid_at(now) => d.apply(&self.base_price),
            _ => self.base_price.clone(),
        }
    }

    // Commands

    pub fn set_name(&mut self, name: impl Into<String>) -> DomainResult<()> {
        self.ensure_modifiable()?;
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.change_set.mark_dirty(Field::Name);
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> DomainResult<()> {
        self.ensure_modifiable()?;
        self.description = description.into();
        self.change_set.mark_dirty(Field::Description);
        Ok(())
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> DomainResult<()> {
        self.ensure_modifiable()?;
        let category = category.into();
        validate_category(&category)?;
        self.category = category;
        self.change_set.mark_dirty(Field::Category);
        Ok(())
    }

    /// Change the base price, recording `product.price.changed` with the
    /// old and new values.
    pub fn set_base_price(&mut self, price: Money, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_modifiable()?;
        validate_price(&price)?;
        let old_price = core::mem::replace(&mut self.base_price, price);
        self.change_set.mark_dirty(Field::BasePrice);
        self.record(ProductEvent::BasePriceChanged(BasePriceChanged {
            product_id: self.id,
            old_price,
            new_price: self.base_price.clone(),
            occurred_at: now,
        }));
        Ok(())
    }

    /// Coalesce a batch of descriptive setters into one `product.updated`.
    ///
    /// Setters themselves record nothing; this emits a single event with
    /// the final values, however many setters ran before it.
    pub fn mark_updated(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_modifiable()?;
        let touched = self.change_set.is_dirty(Field::Name)
            || self.change_set.is_dirty(Field::Description)
            || self.change_set.is_dirty(Field::Category);
        if !touched {
            return Err(DomainError::EmptyUpdate);
        }
        self.updated_at = now;
        self.record(ProductEvent::ProductUpdated(ProductUpdated {
            product_id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            occurred_at: now,
        }));
        Ok(())
    }

    /// Attach a discount. Valid only on an active product with no
    /// discount already attached.
    pub fn apply_discount(&mut self, discount: Discount, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_modifiable()?;
        if self.status != ProductStatus::Active {
            return Err(DomainError::CannotApplyDiscountToInactive);
        }
        if self.discount.is_some() {
            return Err(DomainError::DiscountAlreadyActive);
        }
        self.record(ProductEvent::DiscountApplied(DiscountApplied {
            product_id: self.id,
            percentage: discount.percentage(),
            start_at: discount.start_at(),
            end_at: discount.end_at(),
            applied_at: now,
        }));
        self.discount = Some(discount);
        self.change_set.mark_dirty(Field::Discount);
        Ok(())
    }

    /// Detach the discount. Removing an absent discount is a no-op: no
    /// event, no dirty fields.
    pub fn remove_discount(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_modifiable()?;
        if self.discount.is_none() {
            return Ok(());
        }
        self.discount = None;
        self.change_set.mark_dirty(Field::Discount);
        self.record(ProductEvent::DiscountRemoved(DiscountRemoved {
            product_id: self.id,
            occurred_at: now,
        }));
        Ok(())
    }

    pub fn activate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_modifiable()?;
        if self.status == ProductStatus::Active {
            return Err(DomainError::AlreadyActive);
        }
        self.status = ProductStatus::Active;
        self.change_set.mark_dirty(Field::Status);
        self.record(ProductEvent::ProductActivated(ProductActivated {
            product_id: self.id,
            occurred_at: now,
        }));
        Ok(())
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_modifiable()?;
        if self.status != ProductStatus::Active {
            return Err(DomainError::AlreadyInactive);
        }
        self.status = ProductStatus::Inactive;
        self.change_set.mark_dirty(Field::Status);
        self.record(ProductEvent::ProductDeactivated(ProductDeactivated {
            product_id: self.id,
            occurred_at: now,
        }));
        Ok(())
    }

    /// Soft-delete the product. Terminal: nothing transitions out.
    ///
    /// An attached discount is removed first and its `discount.removed`
    /// event recorded before `product.archived`, so consumers never see a
    /// discount outliving its product.
    pub fn archive(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == ProductStatus::Archived {
            return Err(DomainError::AlreadyArchived);
        }
        if self.discount.take().is_some() {
            self.change_set.mark_dirty(Field::Discount);
            self.record(ProductEvent::DiscountRemoved(DiscountRemoved {
                product_id: self.id,
                occurred_at: now,
            }));
        }
        self.status = ProductStatus::Archived;
        self.archived_at = Some(now);
        self.change_set.mark_dirty(Field::Status);
        self.change_set.mark_dirty(Field::ArchivedAt);
        self.record(ProductEvent::ProductArchived(ProductArchived {
            product_id: self.id,
            archived_at: now,
        }));
        Ok(())
    }

    fn ensure_modifiable(&self) -> DomainResult<()> {
        if self.status == ProductStatus::Archived {
            return Err(DomainError::CannotModifyArchived);
        }
        Ok(())
    }

    fn record(&mut self, event: ProductEvent) {
        self.pending_events.push(event);
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::invalid_name("name cannot be empty"));
    }
    Ok(())
}

fn validate_category(category: &str) -> DomainResult<()> {
    if category.trim().is_empty() {
        return Err(DomainError::invalid_category("category cannot be empty"));
    }
    Ok(())
}

fn validate_price(price: &Money) -> DomainResult<()> {
    if !price.is_positive() {
        return Err(DomainError::invalid_price("price must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn t0() -> DateTime<Utc> {
        ts("2025-01-01T00:00:00Z")
    }

    fn money(n: i64, d: i64) -> Money {
        Money::of(n, d).unwrap()
    }

    fn year_discount(pct: i64) -> Discount {
        Discount::new(
            Decimal::from(pct),
            ts("2025-01-01T00:00:00Z"),
            ts("2025-12-31T23:59:59Z"),
        )
        .unwrap()
    }

    fn new_product() -> Product {
        Product::new(
            ProductId::new(),
            "Widget",
            "A widget",
            "tools",
            money(10_000, 100),
            t0(),
        )
        .unwrap()
    }

    fn active_product() -> Product {
        let mut p = new_product();
        p.activate(t0()).unwrap();
        p.clear_events();
        p
    }

    #[test]
    fn new_product_is_inactive_with_everything_dirty() {
        let p = new_product();
        assert_eq!(p.status(), ProductStatus::Inactive);
        assert_eq!(p.version(), 0);
        assert!(p.archived_at().is_none());
        for field in [
            Field::Name,
            Field::Description,
            Field::Category,
            Field::BasePrice,
            Field::Discount,
            Field::Status,
            Field::ArchivedAt,
        ] {
            assert!(p.change_set().is_dirty(field), "{field:?} should be dirty");
        }
        assert_eq!(p.pending_events().len(), 1);
        assert!(matches!(
            p.pending_events()[0],
            ProductEvent::ProductCreated(_)
        ));
    }

    #[test]
    fn new_rejects_blank_name_category_and_non_positive_price() {
        let id = ProductId::new();
        let err =
            Product::new(id, "  ", "d", "c", money(1, 1), t0()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidName(_)));

        let err = Product::new(id, "n", "d", "", money(1, 1), t0()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidCategory(_)));

        let err = Product::new(id, "n", "d", "c", Money::zero(), t0()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPrice(_)));

        let err = Product::new(id, "n", "d", "c", money(-5, 1), t0()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPrice(_)));
    }

    #[test]
    fn setters_mark_dirty_without_recording_events() {
        let mut p = reconstructed(&new_product());
        p.set_name("Gadget").unwrap();
        p.set_description("Refined").unwrap();
        p.set_category("gear").unwrap();
        assert!(p.change_set().is_dirty(Field::Name));
        assert!(p.change_set().is_dirty(Field::Description));
        assert!(p.change_set().is_dirty(Field::Category));
        assert!(!p.change_set().is_dirty(Field::BasePrice));
        assert!(p.pending_events().is_empty());
    }

    fn reconstructed(p: &Product) -> Product {
        Product::reconstruct(
            p.id_typed(),
            p.name().to_string(),
            p.description().to_string(),
            p.category().to_string(),
            p.base_price().clone(),
            p.discount().cloned(),
            p.status(),
            p.version(),
            p.created_at(),
            p.updated_at(),
            p.archived_at(),
        )
    }

    #[test]
    fn reconstruct_starts_clean() {
        let p = reconstructed(&new_product());
        assert!(!p.change_set().has_changes());
        assert!(p.pending_events().is_empty());
    }

    #[test]
    fn mark_updated_coalesces_setters_into_one_event() {
        let mut p = reconstructed(&new_product());
        p.set_name("Gadget").unwrap();
        p.set_description("Refined").unwrap();
        p.set_category("gear").unwrap();
        p.mark_updated(ts("2025-02-01T00:00:00Z")).unwrap();

        assert_eq!(p.pending_events().len(), 1);
        match &p.pending_events()[0] {
            ProductEvent::ProductUpdated(e) => {
                assert_eq!(e.name, "Gadget");
                assert_eq!(e.description, "Refined");
                assert_eq!(e.category, "gear");
            }
            other => panic!("expected ProductUpdated, got {other:?}"),
        }
        assert_eq!(p.updated_at(), ts("2025-02-01T00:00:00Z"));
    }

    #[test]
    fn mark_updated_without_dirty_fields_is_rejected() {
        let mut p = reconstructed(&new_product());
        let err = p.mark_updated(t0()).unwrap_err();
        assert_eq!(err, DomainError::EmptyUpdate);
        assert!(p.pending_events().is_empty());

        // A dirty price alone does not satisfy the precondition either.
        let mut p = reconstructed(&new_product());
        p.set_base_price(money(1, 1), t0()).unwrap();
        p.clear_events();
        let err = p.mark_updated(t0()).unwrap_err();
        assert_eq!(err, DomainError::EmptyUpdate);
    }

    #[test]
    fn set_base_price_records_old_and_new() {
        let mut p = reconstructed(&new_product());
        p.set_base_price(money(20_000, 100), ts("2025-03-01T00:00:00Z"))
            .unwrap();
        assert_eq!(p.base_price(), &money(200, 1));
        assert!(p.change_set().is_dirty(Field::BasePrice));
        match &p.pending_events()[0] {
            ProductEvent::BasePriceChanged(e) => {
                assert_eq!(e.old_price, money(100, 1));
                assert_eq!(e.new_price, money(200, 1));
            }
            other => panic!("expected BasePriceChanged, got {other:?}"),
        }
    }

    #[test]
    fn set_base_price_rejects_non_positive() {
        let mut p = reconstructed(&new_product());
        let err = p.set_base_price(Money::zero(), t0()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPrice(_)));
        assert_eq!(p.base_price(), &money(100, 1));
        assert!(!p.change_set().has_changes());
        assert!(p.pending_events().is_empty());
    }

    #[test]
    fn activate_transitions_inactive_to_active() {
        let mut p = reconstructed(&new_product());
        p.activate(t0()).unwrap();
        assert_eq!(p.status(), ProductStatus::Active);
        assert!(p.change_set().is_dirty(Field::Status));
        assert!(matches!(
            p.pending_events()[0],
            ProductEvent::ProductActivated(_)
        ));
    }

    #[test]
    fn activate_rejects_already_active() {
        let mut p = active_product();
        let err = p.activate(t0()).unwrap_err();
        assert_eq!(err, DomainError::AlreadyActive);
        assert!(p.pending_events().is_empty());
    }

    #[test]
    fn deactivate_rejects_already_inactive() {
        let mut p = reconstructed(&new_product());
        let err = p.deactivate(t0()).unwrap_err();
        assert_eq!(err, DomainError::AlreadyInactive);
        assert_eq!(p.status(), ProductStatus::Inactive);
        assert!(p.pending_events().is_empty());
    }

    #[test]
    fn deactivate_transitions_active_to_inactive() {
        let mut p = active_product();
        p.deactivate(t0()).unwrap();
        assert_eq!(p.status(), ProductStatus::Inactive);
        assert!(matches!(
            p.pending_events()[0],
            ProductEvent::ProductDeactivated(_)
        ));
    }

    #[test]
    fn apply_discount_requires_active_status() {
        let mut p = reconstructed(&new_product());
        let err = p.apply_discount(year_discount(20), t0()).unwrap_err();
        assert_eq!(err, DomainError::CannotApplyDiscountToInactive);
        assert!(p.discount().is_none());
        assert!(p.pending_events().is_empty());
    }

    #[test]
    fn apply_discount_rejects_a_second_discount() {
        let mut p = active_product();
        p.apply_discount(year_discount(20), t0()).unwrap();
        p.clear_events();
        let err = p.apply_discount(year_discount(10), t0()).unwrap_err();
        assert_eq!(err, DomainError::DiscountAlreadyActive);
        assert_eq!(p.discount().unwrap().percentage(), Decimal::from(20));
        assert!(p.pending_events().is_empty());
    }

    #[test]
    fn effective_price_honors_the_validity_window() {
        let mut p = active_product();
        p.apply_discount(year_discount(20), t0()).unwrap();

        // Inside the window: 100.00 -> 80.00, exact.
        assert_eq!(
            p.effective_price(ts("2025-06-15T12:00:00Z")),
            money(8_000, 100)
        );
        // Outside the window: base price.
        assert_eq!(
            p.effective_price(ts("2026-06-15T12:00:00Z")),
            money(10_000, 100)
        );
    }

    #[test]
    fn effective_price_without_discount_is_the_base_price() {
        let p = reconstructed(&new_product());
        assert_eq!(p.effective_price(t0()), money(100, 1));
    }

    #[test]
    fn remove_discount_without_discount_is_a_no_op() {
        let mut p = active_product();
        p.remove_discount(t0()).unwrap();
        assert!(p.pending_events().is_empty());
        assert!(!p.change_set().has_changes());
    }

    #[test]
    fn remove_discount_detaches_and_records() {
        let mut p = active_product();
        p.apply_discount(year_discount(20), t0()).unwrap();
        p.clear_events();
        p.remove_discount(t0()).unwrap();
        assert!(p.discount().is_none());
        assert!(matches!(
            p.pending_events()[0],
            ProductEvent::DiscountRemoved(_)
        ));
    }

    #[test]
    fn archive_removes_discount_first_and_orders_events() {
        let mut p = active_product();
        p.apply_discount(year_discount(20), t0()).unwrap();

        let archived_at = ts("2025-07-01T00:00:00Z");
        p.archive(archived_at).unwrap();

        assert_eq!(p.status(), ProductStatus::Archived);
        assert_eq!(p.archived_at(), Some(archived_at));
        assert!(p.discount().is_none());

        let types: Vec<&str> = p
            .pending_events()
            .iter()
            .map(procat_events::DomainEvent::event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                "product.discount.applied",
                "product.discount.removed",
                "product.archived",
            ]
        );
    }

    #[test]
    fn archive_from_inactive_is_allowed() {
        let mut p = reconstructed(&new_product());
        p.archive(t0()).unwrap();
        assert_eq!(p.status(), ProductStatus::Archived);
        assert_eq!(p.pending_events().len(), 1);
    }

    #[test]
    fn archive_rejects_already_archived() {
        let mut p = reconstructed(&new_product());
        p.archive(t0()).unwrap();
        p.clear_events();
        let err = p.archive(t0()).unwrap_err();
        assert_eq!(err, DomainError::AlreadyArchived);
        assert!(p.pending_events().is_empty());
    }

    #[test]
    fn archived_products_reject_every_other_command() {
        let mut p = active_product();
        p.archive(t0()).unwrap();
        p.clear_events();
        let before = p.clone();

        assert_eq!(
            p.set_name("x").unwrap_err(),
            DomainError::CannotModifyArchived
        );
        assert_eq!(
            p.set_description("x").unwrap_err(),
            DomainError::CannotModifyArchived
        );
        assert_eq!(
            p.set_category("x").unwrap_err(),
            DomainError::CannotModifyArchived
        );
        assert_eq!(
            p.set_base_price(money(1, 1), t0()).unwrap_err(),
            DomainError::CannotModifyArchived
        );
        assert_eq!(
            p.mark_updated(t0()).unwrap_err(),
            DomainError::CannotModifyArchived
        );
        assert_eq!(
            p.apply_discount(year_discount(5), t0()).unwrap_err(),
            DomainError::CannotModifyArchived
        );
        assert_eq!(
            p.remove_discount(t0()).unwrap_err(),
            DomainError::CannotModifyArchived
        );
        assert_eq!(p.activate(t0()).unwrap_err(), DomainError::CannotModifyArchived);
        assert_eq!(
            p.deactivate(t0()).unwrap_err(),
            DomainError::CannotModifyArchived
        );

        // Rejections leave the aggregate unchanged.
        assert_eq!(p, before);
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            ProductStatus::Inactive,
            ProductStatus::Active,
            ProductStatus::Archived,
        ] {
            assert_eq!(
                status.as_str().parse::<ProductStatus>().unwrap(),
                status
            );
        }
        assert!("draft".parse::<ProductStatus>().is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: after every `set_base_price(p)` with positive `p`,
            /// the aggregate reports exactly `p` and the field is dirty.
            #[test]
            fn set_base_price_tracks_the_latest_value(
                prices in proptest::collection::vec((1i64..1_000_000, 1i64..10_000), 1..8)
            ) {
                let mut product = reconstructed(&new_product());
                for (n, d) in prices {
                    let p = Money::of(n, d).unwrap();
                    product.set_base_price(p.clone(), t0()).unwrap();
                    prop_assert_eq!(product.base_price(), &p);
                    prop_assert!(product.change_set().is_dirty(Field::BasePrice));
                }
            }

            /// Property: one `product.updated` per `mark_updated` call,
            /// independent of how many setters ran before it.
            #[test]
            fn mark_updated_emits_exactly_one_event(setter_count in 1usize..6) {
                let mut product = reconstructed(&new_product());
                for i in 0..setter_count {
                    product.set_name(format!("name-{i}")).unwrap();
                    product.set_description(format!("desc-{i}")).unwrap();
                }
                product.mark_updated(t0()).unwrap();

                let updated: Vec<_> = product
                    .pending_events()
                    .iter()
                    .filter(|e| matches!(e, ProductEvent::ProductUpdated(_)))
                    .collect();
                prop_assert_eq!(updated.len(), 1);
            }

            /// Property: rejected commands never mutate state or record
            /// events, whatever the starting status.
            #[test]
            fn rejections_leave_no_trace(start_active in proptest::bool::ANY) {
                let mut product = if start_active {
                    active_product()
                } else {
                    reconstructed(&new_product())
                };
                let before = product.clone();

                if start_active {
                    prop_assert_eq!(product.activate(t0()).unwrap_err(), DomainError::AlreadyActive);
                } else {
                    prop_assert_eq!(product.deactivate(t0()).unwrap_err(), DomainError::AlreadyInactive);
                    prop_assert_eq!(
                        product.apply_discount(year_discount(10), t0()).unwrap_err(),
                        DomainError::CannotApplyDiscountToInactive
                    );
                }
                prop_assert!(product.set_name("").is_err());
                prop_assert!(product.set_base_price(Money::zero(), t0()).is_err());

                prop_assert_eq!(product, before);
            }
        }
    }
}
