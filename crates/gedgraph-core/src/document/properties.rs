//! Property editing on the document tree

use std::sync::Arc;

use crate::document::Document;
use crate::errors::{GedcomError, Result};
use crate::grammar::MetaNode;
use crate::graph::{NodeId, Payload, TagPath};

/// Direction of a sibling move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Document {
    /// Meta node for `tag` below `parent`
    fn child_meta(&self, parent: NodeId, tag: &str) -> Result<Arc<MetaNode>> {
        let meta = self.meta_of(parent)?;
        Ok(if self.options.remember_unknown_tags {
            meta.child(tag)
        } else {
            meta.child_transient(tag)
        })
    }

    /// Append a new property built by the grammar for `tag`
    ///
    /// # Errors
    ///
    /// * `NodeNotFound` - If the parent is not part of the document
    /// * `InvalidTagPath` - If the tag is empty or malformed
    pub fn add_child(&mut self, parent: NodeId, tag: &str, value: &str) -> Result<NodeId> {
        let position = self.node(parent)?.children().len();
        self.insert_child(parent, position, tag, value)
    }

    /// Insert a new property at `position` among the parent's children
    ///
    /// Positions past the end append.
    ///
    /// # Errors
    ///
    /// * `NodeNotFound` - If the parent is not part of the document
    /// * `InvalidTagPath` - If the tag is empty or malformed
    pub fn insert_child(&mut self, parent: NodeId, position: usize, tag: &str, value: &str) -> Result<NodeId> {
        self.node(parent)?;
        TagPath::root(tag)?;
        let node = self.child_meta(parent, tag)?.create(value);
        let child = self.arena.alloc(node);
        self.raw_insert(parent, position, child)?;
        Ok(child)
    }

    /// Remove a property and everything below it
    ///
    /// Linked cross-references in the removed subtree take their reciprocal
    /// halves with them. Returns false when `child` is not a child of
    /// `parent`, so removing twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the parent is not part of the document.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        if !self.node(parent)?.children().contains(&child) {
            return Ok(false);
        }
        self.delete_subtree(parent, child)?;
        Ok(true)
    }

    /// Replace a property's value, re-parsing it with the same kind
    ///
    /// # Errors
    ///
    /// * `NodeNotFound` - If the node is not part of the document
    /// * `ReferenceLinked` - If the node is a linked cross-reference
    pub fn set_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        let current = self.node(node)?;
        if current.cross_ref().is_some_and(|xref| xref.is_resolved()) {
            return Err(GedcomError::ReferenceLinked {
                tag: current.tag().to_string(),
            });
        }
        let payload = match current.payload() {
            // reference tags switch between pointer and inline text
            Payload::Scalar(_) | Payload::CrossRef(_) => {
                let meta = self.meta_of(node)?;
                if meta.kind().is_cross_ref() {
                    meta.create(value).payload
                } else {
                    current.payload().reparsed(value)
                }
            }
            other => other.reparsed(value),
        };
        if &payload == current.payload() {
            return Ok(());
        }
        self.raw_set_payload(node, payload)
    }

    /// Swap a property with its neighbour
    ///
    /// Returns false when `child` is not a child of `parent` or is already
    /// first (up) or last (down).
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the parent is not part of the document.
    pub fn move_child(&mut self, parent: NodeId, child: NodeId, direction: Direction) -> Result<bool> {
        let children = self.node(parent)?.children();
        let Some(position) = children.iter().position(|c| *c == child) else {
            return Ok(false);
        };
        let other = match direction {
            Direction::Up if position > 0 => position - 1,
            Direction::Down if position + 1 < children.len() => position + 1,
            _ => return Ok(false),
        };
        self.raw_swap_children(parent, other, position)?;
        Ok(true)
    }

    /// Create the grammar's default children below `node`, recursively
    ///
    /// Tags already present are skipped. Returns the created nodes.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the node is not part of the document.
    pub fn add_default_children(&mut self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut created = Vec::new();
        self.add_defaults_into(node, &mut created)?;
        Ok(created)
    }

    fn add_defaults_into(&mut self, node: NodeId, created: &mut Vec<NodeId>) -> Result<()> {
        for meta in self.meta_of(node)?.default_children() {
            let present = self
                .node(node)?
                .children()
                .iter()
                .any(|c| self.node(*c).is_ok_and(|n| n.tag() == meta.tag()));
            if present {
                continue;
            }
            let child = self.add_child(node, meta.tag(), "")?;
            created.push(child);
            self.add_defaults_into(child, created)?;
        }
        Ok(())
    }
}
