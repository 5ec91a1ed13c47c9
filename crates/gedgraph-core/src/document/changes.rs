//! Change tracking types
//!
//! The open `Transaction` collects deduplicated sets of touched nodes plus
//! a journal of primitive mutations; committing freezes the sets into a
//! `ChangeSet` and keeps the journal for undo.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use gedgraph_core_types::ChangeSetId;
use serde::Serialize;

use crate::document::Document;
use crate::graph::{NodeId, Payload};

/// Immutable record of one committed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    id: ChangeSetId,
    committed_at: DateTime<Utc>,
    undo: bool,
    entities_added: BTreeSet<NodeId>,
    entities_deleted: BTreeSet<NodeId>,
    properties_added: BTreeSet<NodeId>,
    properties_deleted: BTreeSet<NodeId>,
    properties_modified: BTreeSet<NodeId>,
}

impl ChangeSet {
    pub fn id(&self) -> ChangeSetId {
        self.id
    }

    pub fn committed_at(&self) -> DateTime<Utc> {
        self.committed_at
    }

    /// Whether this change set reverted an earlier one
    pub fn is_undo(&self) -> bool {
        self.undo
    }

    pub fn entities_added(&self) -> &BTreeSet<NodeId> {
        &self.entities_added
    }

    pub fn entities_deleted(&self) -> &BTreeSet<NodeId> {
        &self.entities_deleted
    }

    pub fn properties_added(&self) -> &BTreeSet<NodeId> {
        &self.properties_added
    }

    pub fn properties_deleted(&self) -> &BTreeSet<NodeId> {
        &self.properties_deleted
    }

    pub fn properties_modified(&self) -> &BTreeSet<NodeId> {
        &self.properties_modified
    }

    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    /// Total size of all sets
    pub fn change_count(&self) -> usize {
        self.entities_added.len()
            + self.entities_deleted.len()
            + self.properties_added.len()
            + self.properties_deleted.len()
            + self.properties_modified.len()
    }
}

/// Handle returned by `Document::add_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Observer of committed transactions
///
/// Listeners run synchronously on the committing thread and see the
/// document as it is after the commit.
pub trait DocumentListener: Send + Sync {
    fn handle_commit(&self, document: &Document, changes: &ChangeSet);
}

impl<F> DocumentListener for F
where
    F: Fn(&Document, &ChangeSet) + Send + Sync,
{
    fn handle_commit(&self, document: &Document, changes: &ChangeSet) {
        self(document, changes)
    }
}

/// One primitive mutation, with what is needed to revert it
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Change {
    NodeInserted { parent: NodeId, child: NodeId },
    NodeRemoved { parent: NodeId, child: NodeId, position: usize },
    PayloadChanged { node: NodeId, previous: Payload },
    TargetChanged { node: NodeId, previous: Option<NodeId> },
    ChildrenSwapped { parent: NodeId, first: usize, second: usize },
    EntityAdded { entity: NodeId },
    EntityRemoved { entity: NodeId, position: usize },
    EntityRenamed { entity: NodeId, previous: String },
    SubmitterChanged { previous: Option<NodeId> },
}

/// Journal of one committed transaction
pub(crate) type Journal = Vec<Change>;

/// Scratch state of the open transaction
#[derive(Debug)]
pub(crate) struct Transaction {
    pub(crate) id: ChangeSetId,
    pub(crate) undo: bool,
    pub(crate) entities_added: BTreeSet<NodeId>,
    pub(crate) entities_deleted: BTreeSet<NodeId>,
    pub(crate) properties_added: BTreeSet<NodeId>,
    pub(crate) properties_deleted: BTreeSet<NodeId>,
    pub(crate) properties_modified: BTreeSet<NodeId>,
    pub(crate) touched_entities: BTreeSet<NodeId>,
    pub(crate) journal: Journal,
}

impl Transaction {
    pub(crate) fn new(undo: bool) -> Self {
        Self {
            id: ChangeSetId::new(),
            undo,
            entities_added: BTreeSet::new(),
            entities_deleted: BTreeSet::new(),
            properties_added: BTreeSet::new(),
            properties_deleted: BTreeSet::new(),
            properties_modified: BTreeSet::new(),
            touched_entities: BTreeSet::new(),
            journal: Vec::new(),
        }
    }

    pub(crate) fn note_property_added(&mut self, node: NodeId) {
        if !self.properties_deleted.remove(&node) {
            self.properties_added.insert(node);
        }
    }

    pub(crate) fn note_property_deleted(&mut self, node: NodeId) {
        self.properties_modified.remove(&node);
        if !self.properties_added.remove(&node) {
            self.properties_deleted.insert(node);
        }
    }

    pub(crate) fn note_property_modified(&mut self, node: NodeId) {
        if !self.properties_added.contains(&node) {
            self.properties_modified.insert(node);
        }
    }

    pub(crate) fn note_entity_added(&mut self, entity: NodeId) {
        if !self.entities_deleted.remove(&entity) {
            self.entities_added.insert(entity);
        }
    }

    pub(crate) fn note_entity_deleted(&mut self, entity: NodeId) {
        self.touched_entities.remove(&entity);
        if !self.entities_added.remove(&entity) {
            self.entities_deleted.insert(entity);
        }
    }

    /// Freeze the sets, returning the change set and the journal
    pub(crate) fn freeze(self) -> (ChangeSet, Journal) {
        let changes = ChangeSet {
            id: self.id,
            committed_at: Utc::now(),
            undo: self.undo,
            entities_added: self.entities_added,
            entities_deleted: self.entities_deleted,
            properties_added: self.properties_added,
            properties_deleted: self.properties_deleted,
            properties_modified: self.properties_modified,
        };
        (changes, self.journal)
    }
}
