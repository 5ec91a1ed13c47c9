//! Path and predicate queries over the document tree

use std::sync::Arc;

use crate::document::Document;
use crate::errors::Result;
use crate::grammar::MetaNode;
use crate::graph::tag_path::{FOLLOW, PARENT, SELF};
use crate::graph::{Node, NodeId, TagPath};

impl Document {
    /// Tag path from the owning entity down to `node`
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the node is not part of the document.
    pub fn path_of(&self, node: NodeId) -> Result<TagPath> {
        let mut tags = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.node(id)?;
            tags.push(n.tag().to_string());
            current = n.parent();
        }
        tags.reverse();
        TagPath::from_segments(tags)
    }

    /// Grammar description of `node`
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the node is not part of the document.
    pub fn meta_of(&self, node: NodeId) -> Result<Arc<MetaNode>> {
        let path = self.path_of(node)?;
        Ok(self.grammar.resolve_with(&path, self.options.remember_unknown_tags))
    }

    /// Nodes reached from `node` by `path`
    ///
    /// The first segment names `node` itself (or is `.`). Later segments
    /// select every child with that tag, `.` stays put, `..` moves to the
    /// parent and `*` follows a linked cross-reference to its reciprocal,
    /// which may live in another entity. Every alternative is explored, so
    /// repeated sibling tags are all visited. Results keep discovery order
    /// without duplicates.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the node is not part of the document.
    pub fn children_matching(&self, node: NodeId, path: &TagPath, valid_only: bool) -> Result<Vec<NodeId>> {
        let start = self.node(node)?;
        let mut out = Vec::new();
        if path.first() == SELF || path.first() == start.tag() {
            self.collect_path(node, path.segments(), 1, valid_only, &mut out);
        }
        Ok(out)
    }

    fn collect_path(&self, at: NodeId, segments: &[String], depth: usize, valid_only: bool, out: &mut Vec<NodeId>) {
        let Ok(node) = self.node(at) else {
            return;
        };
        let Some(segment) = segments.get(depth) else {
            if (!valid_only || node.is_valid()) && !out.contains(&at) {
                out.push(at);
            }
            return;
        };
        match segment.as_str() {
            SELF => self.collect_path(at, segments, depth + 1, valid_only, out),
            PARENT => {
                if let Some(parent) = node.parent() {
                    self.collect_path(parent, segments, depth + 1, valid_only, out);
                }
            }
            FOLLOW => {
                if let Some(target) = node.cross_ref().and_then(|x| x.target()) {
                    self.collect_path(target, segments, depth + 1, valid_only, out);
                }
            }
            tag => {
                for child in node.children() {
                    if self.node(*child).is_ok_and(|c| c.tag() == tag) {
                        self.collect_path(*child, segments, depth + 1, valid_only, out);
                    }
                }
            }
        }
    }

    /// First node reached by `path`
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the node is not part of the document.
    pub fn property(&self, node: NodeId, path: &TagPath, valid_only: bool) -> Result<Option<NodeId>> {
        Ok(self.children_matching(node, path, valid_only)?.into_iter().next())
    }

    /// First descendant of `node` (depth first) accepted by `predicate`
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the node is not part of the document.
    pub fn find_first(&self, node: NodeId, predicate: impl Fn(&Node) -> bool) -> Result<Option<NodeId>> {
        self.node(node)?;
        for id in self.subtree(node)?.into_iter().skip(1) {
            if predicate(self.node(id)?) {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// All descendants of `node` accepted by `predicate`, depth first
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the node is not part of the document.
    pub fn find_all(&self, node: NodeId, predicate: impl Fn(&Node) -> bool) -> Result<Vec<NodeId>> {
        self.node(node)?;
        let mut out = Vec::new();
        for id in self.subtree(node)?.into_iter().skip(1) {
            if predicate(self.node(id)?) {
                out.push(id);
            }
        }
        Ok(out)
    }

    /// Descendants whose value contains `needle`, ignoring case
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the node is not part of the document.
    pub fn find_text(&self, node: NodeId, needle: &str) -> Result<Vec<NodeId>> {
        let needle = needle.to_lowercase();
        self.find_all(node, |n| n.value().to_lowercase().contains(&needle))
    }
}
