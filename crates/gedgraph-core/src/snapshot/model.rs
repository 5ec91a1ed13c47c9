use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::errors::Result;
use crate::graph::{EntityType, NodeId};

/// Position of a node: owning entity plus child indexes from the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub path: Vec<usize>,
}

/// One property in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub tag: String,
    pub value: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_to: Option<LinkTarget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub entity_type: EntityType,
    pub id: String,
    pub properties: Vec<NodeSnapshot>,
}

/// Whole document, entities in collection order per type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub entities: Vec<EntitySnapshot>,
    pub duplicate_ids: Vec<(EntityType, String)>,
    pub submitter: Option<String>,
}

impl DocumentSnapshot {
    /// Capture the current state of `doc`
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the document references a missing node.
    pub fn capture(doc: &Document) -> Result<Self> {
        let mut entities = Vec::new();
        let mut duplicate_ids = Vec::new();
        for entity_type in EntityType::ALL {
            for entity in doc.entities(entity_type) {
                let meta = doc.entity_meta(*entity)?;
                let properties = doc
                    .node(*entity)?
                    .children()
                    .iter()
                    .map(|child| capture_node(doc, *child))
                    .collect::<Result<Vec<_>>>()?;
                entities.push(EntitySnapshot {
                    entity_type,
                    id: meta.id.clone(),
                    properties,
                });
            }
            duplicate_ids.extend(doc.duplicate_ids(entity_type).into_iter().map(|id| (entity_type, id)));
        }
        let submitter = match doc.submitter() {
            Some(entity) => Some(doc.entity_meta(entity)?.id.clone()),
            None => None,
        };
        Ok(Self {
            entities,
            duplicate_ids,
            submitter,
        })
    }
}

fn capture_node(doc: &Document, id: NodeId) -> Result<NodeSnapshot> {
    let node = doc.node(id)?;
    let linked_to = match node.cross_ref().and_then(|x| x.target()) {
        Some(target) => Some(locate(doc, target)?),
        None => None,
    };
    Ok(NodeSnapshot {
        tag: node.tag().to_string(),
        value: node.value(),
        valid: node.is_valid(),
        linked_to,
        children: node
            .children()
            .iter()
            .map(|child| capture_node(doc, *child))
            .collect::<Result<Vec<_>>>()?,
    })
}

fn locate(doc: &Document, node: NodeId) -> Result<LinkTarget> {
    let mut path = Vec::new();
    let mut current = node;
    while let Some(parent) = doc.node(current)?.parent() {
        let position = doc
            .node(parent)?
            .children()
            .iter()
            .position(|c| *c == current)
            .unwrap_or_default();
        path.push(position);
        current = parent;
    }
    path.reverse();
    let meta = doc.entity_meta(current)?;
    Ok(LinkTarget {
        entity_type: meta.entity_type,
        entity_id: meta.id.clone(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_are_captured_by_position() {
        let mut doc = Document::new();
        let indi = doc.create_entity(EntityType::Individual, Some("I1")).unwrap();
        doc.create_entity(EntityType::Family, Some("F1")).unwrap();
        doc.add_child(indi, "NAME", "John /Doe/").unwrap();
        let famc = doc.add_child(indi, "FAMC", "@F1@").unwrap();
        doc.link(famc).unwrap();

        let snapshot = DocumentSnapshot::capture(&doc).unwrap();
        let famc = &snapshot.entities[0].properties[1];
        assert_eq!(
            famc.linked_to,
            Some(LinkTarget {
                entity_type: EntityType::Family,
                entity_id: "F1".to_string(),
                path: vec![0],
            })
        );
        assert_eq!(snapshot.entities[1].properties[0].tag, "CHIL");
    }
}
