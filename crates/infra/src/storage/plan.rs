//! Ordered batch of mutations applied in one transaction.

use super::mutation::Mutation;

/// Accumulates the storage mutations of one use-case invocation.
///
/// Created per invocation, consumed by the committer. Order is preserved:
/// mutations apply in the order they were added.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommitPlan {
    mutations: Vec<Mutation>,
}

impl CommitPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    /// Add a mutation that may not exist (e.g. an update with an empty
    /// change set). `None` is ignored.
    pub fn add_opt(&mut self, mutation: Option<Mutation>) {
        if let Some(m) = mutation {
            self.mutations.push(m);
        }
    }

    pub fn add_all(&mut self, mutations: impl IntoIterator<Item = Mutation>) {
        self.mutations.extend(mutations);
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }
}
