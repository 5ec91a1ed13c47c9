use std::fmt;

use crate::document::Document;
use crate::graph::{EntityType, NodeId, XRefKind};

/// One broken structural guarantee of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// Entity in a collection without a matching index entry
    UnindexedEntity { entity_type: EntityType, entity: NodeId },
    /// Index entry whose holder is not in the collection
    DanglingIndexEntry { entity_type: EntityType, id: String },
    /// Duplicates set disagrees with the index contents
    StaleDuplicate { entity_type: EntityType, id: String },
    /// Resolved reference whose reciprocal is gone or points elsewhere
    AsymmetricLink { node: NodeId, target: NodeId },
    /// Backlink marker that no longer backs any reference
    OrphanedMarker { node: NodeId },
    /// Child whose parent pointer disagrees with its parent's child list
    BrokenParentLink { parent: NodeId, child: NodeId },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnindexedEntity { entity_type, entity } => {
                write!(f, "{entity_type} {entity} is not indexed")
            }
            Self::DanglingIndexEntry { entity_type, id } => {
                write!(f, "{entity_type} index entry '{id}' has no entity")
            }
            Self::StaleDuplicate { entity_type, id } => {
                write!(f, "{entity_type} duplicate tracking of '{id}' is stale")
            }
            Self::AsymmetricLink { node, target } => {
                write!(f, "link {node} -> {target} is not reciprocated")
            }
            Self::OrphanedMarker { node } => write!(f, "backlink marker {node} is orphaned"),
            Self::BrokenParentLink { parent, child } => {
                write!(f, "{child} is listed under {parent} but does not point back")
            }
        }
    }
}

/// Find collection members that the id index does not hold
pub fn find_unindexed_entities(doc: &Document) -> Vec<IntegrityViolation> {
    let mut out = Vec::new();
    for entity_type in EntityType::ALL {
        for entity in doc.entities(entity_type) {
            let indexed = doc
                .node(*entity)
                .ok()
                .and_then(|n| n.entity_meta())
                .zip(doc.indexes.get(&entity_type))
                .is_some_and(|(meta, index)| index.holds(&meta.id, *entity));
            if !indexed {
                out.push(IntegrityViolation::UnindexedEntity {
                    entity_type,
                    entity: *entity,
                });
            }
        }
    }
    out
}

/// Find index entries whose holder is not an attached collection member
pub fn find_dangling_index_entries(doc: &Document) -> Vec<IntegrityViolation> {
    let mut out = Vec::new();
    for (entity_type, index) in &doc.indexes {
        let members = doc.entities(*entity_type);
        for (id, holder) in index.entries() {
            let held_id = doc.node(holder).ok().and_then(|n| n.entity_meta()).map(|m| m.id.as_str());
            if !members.contains(&holder) || held_id != Some(id) {
                out.push(IntegrityViolation::DanglingIndexEntry {
                    entity_type: *entity_type,
                    id: id.to_string(),
                });
            }
        }
    }
    out
}

/// Find ids whose duplicate tracking disagrees with the index
pub fn find_stale_duplicates(doc: &Document) -> Vec<IntegrityViolation> {
    let mut out = Vec::new();
    for (entity_type, index) in &doc.indexes {
        let shared = index.shared_ids();
        let tracked: Vec<&String> = index.duplicates().collect();
        let stale = tracked
            .iter()
            .filter(|id| !shared.contains(**id))
            .map(|id| (*id).clone())
            .chain(shared.iter().filter(|id| !tracked.contains(id)).cloned());
        out.extend(stale.map(|id| IntegrityViolation::StaleDuplicate {
            entity_type: *entity_type,
            id,
        }));
    }
    out
}

/// Find resolved references without a reachable, pointing-back reciprocal
pub fn find_asymmetric_links(doc: &Document) -> Vec<IntegrityViolation> {
    doc.arena
        .attached()
        .filter_map(|(id, node)| {
            let target = node.cross_ref()?.target()?;
            let back = doc.node(target).ok().and_then(|t| t.cross_ref()).and_then(|x| x.target());
            (back != Some(id)).then_some(IntegrityViolation::AsymmetricLink { node: id, target })
        })
        .collect()
}

/// Find backlink markers that are not linked to a reference
pub fn find_orphaned_markers(doc: &Document) -> Vec<IntegrityViolation> {
    doc.arena
        .attached()
        .filter(|(_, node)| {
            node.cross_ref()
                .is_some_and(|x| x.kind() == XRefKind::Foreign && !x.is_resolved())
        })
        .map(|(node, _)| IntegrityViolation::OrphanedMarker { node })
        .collect()
}

/// Find children whose parent pointer or attachment disagrees with the tree
pub fn find_broken_parent_links(doc: &Document) -> Vec<IntegrityViolation> {
    let mut out = Vec::new();
    for (parent, node) in doc.arena.attached() {
        for child in node.children() {
            let consistent = doc.node(*child).is_ok_and(|c| c.parent() == Some(parent));
            if !consistent {
                out.push(IntegrityViolation::BrokenParentLink { parent, child: *child });
            }
        }
    }
    out
}

/// Run every checker
pub fn check_all(doc: &Document) -> Vec<IntegrityViolation> {
    let mut out = find_unindexed_entities(doc);
    out.extend(find_dangling_index_entries(doc));
    out.extend(find_stale_duplicates(doc));
    out.extend(find_asymmetric_links(doc));
    out.extend(find_orphaned_markers(doc));
    out.extend(find_broken_parent_links(doc));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked_couple() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let indi = doc.create_entity(EntityType::Individual, Some("I1")).unwrap();
        let fam = doc.create_entity(EntityType::Family, Some("F1")).unwrap();
        let fams = doc.add_child(indi, "FAMS", "@F1@").unwrap();
        doc.link(fams).unwrap();
        (doc, indi, fams)
    }

    #[test]
    fn test_clean_document_has_no_violations() {
        let (doc, _, _) = linked_couple();
        assert!(check_all(&doc).is_empty());
    }

    #[test]
    fn test_detects_one_sided_link() {
        let (mut doc, _, fams) = linked_couple();
        let husb = doc.node(fams).unwrap().cross_ref().unwrap().target().unwrap();
        doc.raw_set_target(husb, None).unwrap();

        let violations = find_asymmetric_links(&doc);
        assert_eq!(
            violations,
            vec![IntegrityViolation::AsymmetricLink {
                node: fams,
                target: husb
            }]
        );
    }

    #[test]
    fn test_detects_orphaned_marker() {
        let mut doc = Document::new();
        let indi = doc.create_entity(EntityType::Individual, Some("I1")).unwrap();
        doc.create_entity(EntityType::Note, Some("N1")).unwrap();
        let note = doc.add_child(indi, "NOTE", "@N1@").unwrap();
        doc.link(note).unwrap();
        let marker = doc.node(note).unwrap().cross_ref().unwrap().target().unwrap();
        doc.raw_set_target(marker, None).unwrap();
        doc.raw_set_target(note, None).unwrap();

        assert_eq!(
            find_orphaned_markers(&doc),
            vec![IntegrityViolation::OrphanedMarker { node: marker }]
        );
    }

    #[test]
    fn test_duplicates_are_tracked_consistently() {
        let mut doc = Document::new();
        doc.import_entity(EntityType::Source, "S1").unwrap();
        let second = doc.import_entity(EntityType::Source, "S1").unwrap();
        assert!(find_stale_duplicates(&doc).is_empty());

        doc.delete_entity(second).unwrap();
        assert!(find_stale_duplicates(&doc).is_empty());
        assert!(doc.duplicate_ids(EntityType::Source).is_empty());
    }
}
