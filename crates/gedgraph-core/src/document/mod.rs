//! The document aggregate
//!
//! A `Document` owns every node of one genealogy in an arena, keeps the
//! per-type entity collections and id indexes, links cross-references and
//! records mutations into the open transaction.

pub mod changes;
pub mod entities;
pub mod family;
pub(crate) mod index;
pub mod linker;
pub(crate) mod primitives;
pub mod properties;
pub mod query;
pub mod shared;
pub mod transaction;

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::errors::{GedcomError, Result};
use crate::grammar::Grammar;
use crate::graph::arena::Arena;
use crate::graph::{EntityMeta, EntityType, Node, NodeId};
use crate::options::DocumentOptions;
use crate::policy::{ChangeStampPolicy, NeverStamp};

pub use changes::{ChangeSet, DocumentListener, ListenerId};
pub use properties::Direction;
pub use shared::SharedDocument;

use changes::{Journal, Transaction};
use index::IdIndex;

/// In-memory genealogy: entities, their property trees and links
pub struct Document {
    pub(crate) grammar: Arc<Grammar>,
    pub(crate) options: DocumentOptions,
    pub(crate) stamp_policy: Box<dyn ChangeStampPolicy>,
    pub(crate) arena: Arena,
    pub(crate) collections: BTreeMap<EntityType, Vec<NodeId>>,
    pub(crate) indexes: BTreeMap<EntityType, IdIndex>,
    pub(crate) submitter: Option<NodeId>,
    pub(crate) min_id_width: usize,
    pub(crate) transaction: Option<Transaction>,
    pub(crate) listeners: Vec<(ListenerId, Box<dyn DocumentListener>)>,
    pub(crate) next_listener: u64,
    pub(crate) unsaved: bool,
    pub(crate) undo_stack: VecDeque<Journal>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("collections", &self.collections)
            .field("submitter", &self.submitter)
            .field("transaction_open", &self.transaction.is_some())
            .field("listeners", &self.listeners.len())
            .field("unsaved", &self.unsaved)
            .field("undo_depth", &self.undo_stack.len())
            .finish()
    }
}

impl Document {
    /// Empty document using the standard grammar and default options
    pub fn new() -> Self {
        Self::with_options(Grammar::standard(), DocumentOptions::default())
    }

    /// Empty document using a custom grammar
    pub fn with_grammar(grammar: Arc<Grammar>) -> Self {
        Self::with_options(grammar, DocumentOptions::default())
    }

    pub fn with_options(grammar: Arc<Grammar>, options: DocumentOptions) -> Self {
        Self {
            grammar,
            min_id_width: options.min_id_width,
            options,
            stamp_policy: Box::new(NeverStamp),
            arena: Arena::default(),
            collections: EntityType::ALL.iter().map(|t| (*t, Vec::new())).collect(),
            indexes: EntityType::ALL.iter().map(|t| (*t, IdIndex::default())).collect(),
            submitter: None,
            transaction: None,
            listeners: Vec::new(),
            next_listener: 0,
            unsaved: false,
            undo_stack: VecDeque::new(),
        }
    }

    /// Replace the change stamp policy
    pub fn with_stamp_policy(mut self, policy: impl ChangeStampPolicy + 'static) -> Self {
        self.stamp_policy = Box::new(policy);
        self
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Whether `id` names a node that is part of the document
    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(Node::is_attached)
    }

    /// An attached node
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown or detached nodes.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.arena
            .get(id)
            .filter(|node| node.attached)
            .ok_or(GedcomError::NodeNotFound { node: id })
    }

    /// Any allocated node, attached or not
    pub(crate) fn slot(&self, id: NodeId) -> Result<&Node> {
        self.arena.get(id).ok_or(GedcomError::NodeNotFound { node: id })
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.arena.get_mut(id).ok_or(GedcomError::NodeNotFound { node: id })
    }

    /// Identity of an attached entity node
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for detached nodes and `EntityNotFound` for
    /// nodes that are not entities.
    pub fn entity_meta(&self, entity: NodeId) -> Result<&EntityMeta> {
        self.node(entity)?
            .entity_meta()
            .ok_or_else(|| GedcomError::EntityNotFound {
                id: entity.to_string(),
            })
    }

    /// Entity that owns `node` (the node itself for entities)
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for detached nodes.
    pub fn entity_of(&self, node: NodeId) -> Result<NodeId> {
        let mut current = node;
        loop {
            match self.node(current)?.parent {
                Some(parent) => current = parent,
                None => return Ok(current),
            }
        }
    }

    /// `node` and all its descendants, parents before children
    pub(crate) fn subtree(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.slot(id)?;
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Entity collection of a type, in creation order
    pub fn entities(&self, entity_type: EntityType) -> &[NodeId] {
        self.collections
            .get(&entity_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn entity_count(&self, entity_type: EntityType) -> usize {
        self.entities(entity_type).len()
    }

    /// Entity of a type with the given id
    ///
    /// # Errors
    ///
    /// Returns `AmbiguousId` when several entities share the id.
    pub fn entity(&self, entity_type: EntityType, id: &str) -> Result<Option<NodeId>> {
        match self.indexes.get(&entity_type) {
            Some(index) => index.get(id.trim().trim_matches('@')),
            None => Ok(None),
        }
    }

    /// Ids currently shared by more than one entity of the type
    pub fn duplicate_ids(&self, entity_type: EntityType) -> Vec<String> {
        self.indexes
            .get(&entity_type)
            .map(|index| index.duplicates().cloned().collect())
            .unwrap_or_default()
    }

    /// Designated submitter entity
    pub fn submitter(&self) -> Option<NodeId> {
        self.submitter
    }

    pub(crate) fn index_mut(&mut self, entity_type: EntityType) -> &mut IdIndex {
        self.indexes.entry(entity_type).or_default()
    }

    pub(crate) fn collection_mut(&mut self, entity_type: EntityType) -> &mut Vec<NodeId> {
        self.collections.entry(entity_type).or_default()
    }
}
