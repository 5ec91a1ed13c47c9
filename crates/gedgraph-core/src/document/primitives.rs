//! Journaled mutation primitives
//!
//! Every structural change of a document goes through one of these
//! functions. Inside a transaction they update the change sets and append
//! a `Change` to the journal; outside one they are applied silently and
//! invalidate the undo history.

use crate::document::changes::{Change, Transaction};
use crate::document::Document;
use crate::errors::{GedcomError, Result};
use crate::graph::{NodeId, Payload};

impl Document {
    fn track(&mut self, anchor: Option<NodeId>, change: Change, note: impl FnOnce(&mut Transaction)) {
        let owner = anchor
            .filter(|node| self.contains(*node))
            .and_then(|node| self.entity_of(node).ok());
        match self.transaction.as_mut() {
            Some(tx) => {
                note(tx);
                if let Some(owner) = owner {
                    tx.touched_entities.insert(owner);
                }
                tx.journal.push(change);
            }
            None => self.undo_stack.clear(),
        }
    }

    fn set_attached(&mut self, root: NodeId, attached: bool) -> Result<()> {
        for id in self.subtree(root)? {
            self.slot_mut(id)?.attached = attached;
        }
        Ok(())
    }

    /// Wire `child` under `parent` at `position` (clamped)
    pub(crate) fn raw_insert(&mut self, parent: NodeId, position: usize, child: NodeId) -> Result<()> {
        let attached = self.slot(parent)?.attached;
        self.slot(child)?;
        let parent_node = self.slot_mut(parent)?;
        let position = position.min(parent_node.children.len());
        parent_node.children.insert(position, child);
        self.slot_mut(child)?.parent = Some(parent);
        self.set_attached(child, attached)?;
        self.track(Some(parent), Change::NodeInserted { parent, child }, |tx| {
            tx.note_property_added(child)
        });
        Ok(())
    }

    /// Unwire `child` from `parent`, detaching its subtree
    pub(crate) fn raw_remove(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let position = self
            .slot(parent)?
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or(GedcomError::NodeNotFound { node: child })?;
        // owner must be resolved while the parent chain is intact
        let owner = self.entity_of(parent).ok();
        self.slot_mut(parent)?.children.remove(position);
        self.slot_mut(child)?.parent = None;
        self.set_attached(child, false)?;
        self.track(
            owner,
            Change::NodeRemoved {
                parent,
                child,
                position,
            },
            |tx| tx.note_property_deleted(child),
        );
        Ok(())
    }

    pub(crate) fn raw_set_payload(&mut self, node: NodeId, payload: Payload) -> Result<()> {
        let previous = std::mem::replace(&mut self.slot_mut(node)?.payload, payload);
        self.track(Some(node), Change::PayloadChanged { node, previous }, |tx| {
            tx.note_property_modified(node)
        });
        Ok(())
    }

    pub(crate) fn raw_set_target(&mut self, node: NodeId, target: Option<NodeId>) -> Result<()> {
        let xref = self
            .slot_mut(node)?
            .payload
            .as_cross_ref_mut()
            .ok_or_else(|| GedcomError::StructuralConsistency {
                reason: format!("node {node} is not a cross-reference"),
            })?;
        let previous = std::mem::replace(&mut xref.target, target);
        self.track(Some(node), Change::TargetChanged { node, previous }, |tx| {
            tx.note_property_modified(node)
        });
        Ok(())
    }

    pub(crate) fn raw_swap_children(&mut self, parent: NodeId, first: usize, second: usize) -> Result<()> {
        let children = &mut self.slot_mut(parent)?.children;
        if first >= children.len() || second >= children.len() {
            return Err(GedcomError::StructuralConsistency {
                reason: format!("cannot swap positions {first} and {second} of {parent}"),
            });
        }
        children.swap(first, second);
        self.track(
            Some(parent),
            Change::ChildrenSwapped {
                parent,
                first,
                second,
            },
            |tx| tx.note_property_modified(parent),
        );
        Ok(())
    }

    /// Append an allocated entity node to its collection and index
    pub(crate) fn raw_add_entity(&mut self, entity: NodeId) -> Result<()> {
        let position = self
            .slot(entity)?
            .entity
            .as_ref()
            .map(|meta| self.entities(meta.entity_type).len())
            .unwrap_or_default();
        self.raw_insert_entity(entity, position)
    }

    fn raw_insert_entity(&mut self, entity: NodeId, position: usize) -> Result<()> {
        let meta = self
            .slot(entity)?
            .entity
            .clone()
            .ok_or_else(|| GedcomError::EntityNotFound {
                id: entity.to_string(),
            })?;
        let collection = self.collection_mut(meta.entity_type);
        let position = position.min(collection.len());
        collection.insert(position, entity);
        self.index_mut(meta.entity_type).insert(&meta.id, entity);
        self.set_attached(entity, true)?;
        self.track(Some(entity), Change::EntityAdded { entity }, |tx| {
            tx.note_entity_added(entity)
        });
        Ok(())
    }

    /// Take an entity out of its collection and index, detaching it
    pub(crate) fn raw_remove_entity(&mut self, entity: NodeId) -> Result<()> {
        let meta = self
            .slot(entity)?
            .entity
            .clone()
            .ok_or_else(|| GedcomError::EntityNotFound {
                id: entity.to_string(),
            })?;
        let collection = self.collection_mut(meta.entity_type);
        let position = collection
            .iter()
            .position(|e| *e == entity)
            .ok_or_else(|| GedcomError::EntityNotFound {
                id: meta.id.clone(),
            })?;
        collection.remove(position);
        self.index_mut(meta.entity_type).remove(&meta.id, entity);
        self.set_attached(entity, false)?;
        self.track(None, Change::EntityRemoved { entity, position }, |tx| {
            tx.note_entity_deleted(entity)
        });
        Ok(())
    }

    pub(crate) fn raw_rename(&mut self, entity: NodeId, new_id: &str) -> Result<()> {
        let meta = self
            .slot_mut(entity)?
            .entity
            .as_mut()
            .ok_or_else(|| GedcomError::EntityNotFound {
                id: entity.to_string(),
            })?;
        let previous = std::mem::replace(&mut meta.id, new_id.to_string());
        let entity_type = meta.entity_type;
        let index = self.index_mut(entity_type);
        index.remove(&previous, entity);
        index.insert(new_id, entity);
        self.track(Some(entity), Change::EntityRenamed { entity, previous }, |tx| {
            tx.note_property_modified(entity)
        });
        Ok(())
    }

    pub(crate) fn raw_set_submitter(&mut self, submitter: Option<NodeId>) {
        let previous = std::mem::replace(&mut self.submitter, submitter);
        let noted = submitter.or(previous).filter(|e| self.contains(*e));
        self.track(noted, Change::SubmitterChanged { previous }, |tx| {
            if let Some(entity) = noted {
                tx.note_property_modified(entity);
            }
        });
    }

    /// Revert one journaled change
    pub(crate) fn apply_inverse(&mut self, change: &Change) -> Result<()> {
        match change {
            Change::NodeInserted { parent, child } => self.raw_remove(*parent, *child),
            Change::NodeRemoved {
                parent,
                child,
                position,
            } => self.raw_insert(*parent, *position, *child),
            Change::PayloadChanged { node, previous } => self.raw_set_payload(*node, previous.clone()),
            Change::TargetChanged { node, previous } => self.raw_set_target(*node, *previous),
            Change::ChildrenSwapped {
                parent,
                first,
                second,
            } => self.raw_swap_children(*parent, *first, *second),
            Change::EntityAdded { entity } => self.raw_remove_entity(*entity),
            Change::EntityRemoved { entity, position } => self.raw_insert_entity(*entity, *position),
            Change::EntityRenamed { entity, previous } => self.raw_rename(*entity, previous),
            Change::SubmitterChanged { previous } => {
                self.raw_set_submitter(*previous);
                Ok(())
            }
        }
    }
}
