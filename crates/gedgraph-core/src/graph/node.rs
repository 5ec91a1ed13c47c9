use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::{CrossRef, DateValue, NameValue, Payload, SexValue};

/// Stable arena index of a node inside one `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Record types that can be entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Individual,
    Family,
    Media,
    Note,
    Source,
    Submitter,
    Repository,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Individual,
        EntityType::Family,
        EntityType::Media,
        EntityType::Note,
        EntityType::Source,
        EntityType::Submitter,
        EntityType::Repository,
    ];

    /// GEDCOM record tag
    pub fn tag(self) -> &'static str {
        match self {
            EntityType::Individual => "INDI",
            EntityType::Family => "FAM",
            EntityType::Media => "OBJE",
            EntityType::Note => "NOTE",
            EntityType::Source => "SOUR",
            EntityType::Submitter => "SUBM",
            EntityType::Repository => "REPO",
        }
    }

    /// Prefix of generated ids
    pub fn id_prefix(self) -> &'static str {
        match self {
            EntityType::Individual => "I",
            EntityType::Family => "F",
            EntityType::Media => "M",
            EntityType::Note => "N",
            EntityType::Source => "S",
            EntityType::Submitter => "B",
            EntityType::Repository => "R",
        }
    }

    pub fn from_tag(tag: &str) -> Option<EntityType> {
        EntityType::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Identity carried by entity nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: String,
    pub entity_type: EntityType,
}

/// A tagged element of the property graph
///
/// Nodes created by a grammar factory start detached with no children;
/// the document wires them into the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) tag: String,
    pub(crate) payload: Payload,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) entity: Option<EntityMeta>,
    pub(crate) attached: bool,
}

impl Node {
    pub fn new(tag: impl Into<String>, payload: Payload) -> Self {
        Self {
            tag: tag.into(),
            payload,
            children: Vec::new(),
            parent: None,
            entity: None,
            attached: false,
        }
    }

    pub(crate) fn entity(entity_type: EntityType, id: String) -> Self {
        let mut node = Node::new(entity_type.tag(), Payload::Composite(String::new()));
        node.entity = Some(EntityMeta { id, entity_type });
        node
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Value as GEDCOM text
    pub fn value(&self) -> String {
        self.payload.as_text()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn entity_meta(&self) -> Option<&EntityMeta> {
        self.entity.as_ref()
    }

    pub fn is_entity(&self) -> bool {
        self.entity.is_some()
    }

    /// Whether the node is currently reachable from the document
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_valid(&self) -> bool {
        self.payload.is_valid()
    }

    pub fn cross_ref(&self) -> Option<&CrossRef> {
        self.payload.as_cross_ref()
    }

    pub fn date(&self) -> Option<&DateValue> {
        match &self.payload {
            Payload::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&NameValue> {
        match &self.payload {
            Payload::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn sex(&self) -> Option<&SexValue> {
        match &self.payload {
            Payload::Sex(sex) => Some(sex),
            _ => None,
        }
    }
}
