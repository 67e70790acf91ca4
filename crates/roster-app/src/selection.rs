// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::ClientId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    ids: BTreeSet<ClientId>,
}

impl Selection {
    /// Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: ClientId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Clears when the selection is as large as the visible set, otherwise
    /// selects exactly the visible set. Only sizes are compared.
    pub fn select_all(&mut self, visible: &[ClientId]) {
        if self.ids.len() == visible.len() {
            self.ids.clear();
        } else {
            self.ids = visible.iter().copied().collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.ids.iter().copied()
    }

    /// State of the select-all checkbox.
    pub fn covers(&self, visible: &[ClientId]) -> bool {
        !visible.is_empty() && self.ids.len() == visible.len()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            ids: self.ids.iter().copied().collect(),
        }
    }
}

/// Frozen copy of the selection handed to a bulk action when it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    ids: Arc<[ClientId]>,
}

impl SelectionSnapshot {
    pub fn ids(&self) -> &[ClientId] {
        &self.ids
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;
    use crate::ClientId;
    use proptest::prelude::*;

    fn ids(values: &[i64]) -> Vec<ClientId> {
        values.iter().copied().map(ClientId::new).collect()
    }

    #[test]
    fn toggle_is_symmetric_difference() {
        let mut selection = Selection::default();
        assert!(selection.toggle(ClientId::new(1)));
        assert!(selection.toggle(ClientId::new(2)));
        assert!(!selection.toggle(ClientId::new(1)));
        assert_eq!(selection.iter().collect::<Vec<_>>(), ids(&[2]));
    }

    #[test]
    fn select_all_clears_a_full_selection() {
        let visible = ids(&[1, 2, 3]);
        let mut selection = Selection::default();

        selection.select_all(&visible);
        assert_eq!(selection.len(), 3);
        assert!(selection.covers(&visible));

        selection.select_all(&visible);
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_replaces_partial_selection_with_visible_set() {
        let mut selection = Selection::default();
        selection.toggle(ClientId::new(9));

        selection.select_all(&ids(&[1, 2]));
        assert_eq!(selection.iter().collect::<Vec<_>>(), ids(&[1, 2]));
        assert!(!selection.contains(ClientId::new(9)));
    }

    #[test]
    fn select_all_compares_sizes_not_members() {
        let mut selection = Selection::default();
        selection.select_all(&ids(&[1, 2]));

        // Same size, different members: still treated as "everything selected".
        selection.select_all(&ids(&[3, 4]));
        assert!(selection.is_empty());
    }

    #[test]
    fn empty_visible_set_never_reports_covered() {
        let selection = Selection::default();
        assert!(!selection.covers(&[]));
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        let mut selection = Selection::default();
        selection.toggle(ClientId::new(1));
        let snapshot = selection.snapshot();

        selection.toggle(ClientId::new(2));
        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.ids(), ids(&[1]).as_slice());
    }

    proptest! {
        #[test]
        fn select_all_yields_empty_or_exact_visible_set(
            prior in prop::collection::btree_set(0_i64..20, 0..10),
            visible in prop::collection::btree_set(0_i64..20, 0..10),
        ) {
            let mut selection = Selection::default();
            for id in &prior {
                selection.toggle(ClientId::new(*id));
            }
            let visible: Vec<ClientId> = visible.into_iter().map(ClientId::new).collect();
            let was_full = selection.len() == visible.len();

            selection.select_all(&visible);
            if was_full {
                prop_assert!(selection.is_empty());
            } else {
                prop_assert_eq!(selection.iter().collect::<Vec<_>>(), visible);
            }
        }
    }
}
