//! Per-field dirty tracking for partial updates.

use std::collections::BTreeSet;

/// Updatable columns of the product row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Description,
    Category,
    BasePrice,
    Discount,
    Status,
    ArchivedAt,
}

/// Set of fields modified since the aggregate was loaded or created.
///
/// Command methods write to it; the repository consults it to build
/// updates touching only dirty columns, which keeps write amplification
/// and the lock footprint of the commit transaction down. Cleared on
/// rehydration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    dirty: BTreeSet<Field>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, field: Field) {
        self.dirty.insert(field);
    }

    pub fn is_dirty(&self, field: Field) -> bool {
        self.dirty.contains(&field)
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn clear(&mut self) {
        self.dirty.clear();
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.dirty.iter().copied()
    }
}
