use std::collections::{BTreeSet, HashMap};

use crate::errors::{GedcomError, Result};
use crate::graph::NodeId;

/// Id lookup for one entity type
///
/// Duplicate ids are kept rather than rejected; lookups of a duplicated id
/// fail until all but one holder is renamed or deleted.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdIndex {
    by_id: HashMap<String, Vec<NodeId>>,
    duplicates: BTreeSet<String>,
}

impl IdIndex {
    pub(crate) fn insert(&mut self, id: &str, node: NodeId) {
        let holders = self.by_id.entry(id.to_string()).or_default();
        if !holders.contains(&node) {
            holders.push(node);
        }
        if holders.len() > 1 {
            self.duplicates.insert(id.to_string());
        }
    }

    /// Drop one holder of `id`; false when it was not indexed
    pub(crate) fn remove(&mut self, id: &str, node: NodeId) -> bool {
        let Some(holders) = self.by_id.get_mut(id) else {
            return false;
        };
        let Some(position) = holders.iter().position(|n| *n == node) else {
            return false;
        };
        holders.remove(position);
        match holders.len() {
            0 => {
                self.by_id.remove(id);
                self.duplicates.remove(id);
            }
            1 => {
                self.duplicates.remove(id);
            }
            _ => {}
        }
        true
    }

    pub(crate) fn get(&self, id: &str) -> Result<Option<NodeId>> {
        match self.by_id.get(id).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([single]) => Ok(Some(*single)),
            Some(holders) => Err(GedcomError::AmbiguousId {
                id: id.to_string(),
                count: holders.len(),
            }),
        }
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub(crate) fn holds(&self, id: &str, node: NodeId) -> bool {
        self.by_id.get(id).is_some_and(|holders| holders.contains(&node))
    }

    pub(crate) fn duplicates(&self) -> impl Iterator<Item = &String> {
        self.duplicates.iter()
    }

    /// Every `(id, holder)` pair
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.by_id
            .iter()
            .flat_map(|(id, holders)| holders.iter().map(move |node| (id.as_str(), *node)))
    }

    /// Ids held by two or more nodes, computed from the entries
    pub(crate) fn shared_ids(&self) -> BTreeSet<String> {
        self.by_id
            .iter()
            .filter(|(_, holders)| holders.len() > 1)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> NodeId {
        NodeId::from_index(n)
    }

    #[test]
    fn test_duplicate_tracking() {
        let mut index = IdIndex::default();
        index.insert("I1", id(0));
        index.insert("I1", id(1));

        assert!(matches!(index.get("I1"), Err(GedcomError::AmbiguousId { count: 2, .. })));
        assert_eq!(index.duplicates().count(), 1);

        assert!(index.remove("I1", id(0)));
        assert_eq!(index.get("I1").unwrap(), Some(id(1)));
        assert_eq!(index.duplicates().count(), 0);
    }

    #[test]
    fn test_remove_unknown_is_false() {
        let mut index = IdIndex::default();
        index.insert("F1", id(3));
        assert!(!index.remove("F1", id(4)));
        assert!(!index.remove("F2", id(3)));
        assert!(index.remove("F1", id(3)));
        assert!(!index.contains("F1"));
        assert_eq!(index.get("F1").unwrap(), None);
    }

    #[test]
    fn test_shared_ids_match_duplicates() {
        let mut index = IdIndex::default();
        index.insert("S1", id(0));
        index.insert("S1", id(1));
        index.insert("S2", id(2));
        let tracked: BTreeSet<String> = index.duplicates().cloned().collect();
        assert_eq!(tracked, index.shared_ids());
    }
}
