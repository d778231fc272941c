//! Exercise binder.
//!
//! The binding table maps a skeleton id to the currently live solution
//! callable. Binding is total overwrite: only the most recent successful
//! submission for a skeleton is ever live. A failed resolution must
//! short-circuit before [`BindingTable::bind`] is reached, so the table never
//! sees an absent solution.

use std::collections::BTreeMap;

use kata_grader_types::OperationInfo;
use tracing::debug;

/// Session-scoped map from skeleton id to the active solution callable.
///
/// Keyed by the skeleton's name, which is stable across submissions for the
/// same exercise; skeletons persist for the session, so there is no removal
/// operation.
#[derive(Debug, Default)]
pub struct BindingTable {
    entries: BTreeMap<String, OperationInfo>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `solution` over `skeleton`, replacing any previous binding.
    pub fn bind(&mut self, skeleton: &OperationInfo, solution: OperationInfo) {
        let replaced = self
            .entries
            .insert(skeleton.name.clone(), solution)
            .is_some();
        debug!(skeleton = %skeleton.name, replaced, "bound solution");
    }

    /// The live solution for a skeleton, if any submission has bound one.
    pub fn active(&self, skeleton_id: &str) -> Option<&OperationInfo> {
        self.entries.get(skeleton_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
