//! Relationship queries over linked family references
//!
//! Only resolved references count: a `FAMS` that was never linked does not
//! make anyone a spouse.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::document::Document;
use crate::errors::Result;
use crate::graph::{CrossRef, NodeId};
use crate::time::{Delta, PointInTime};

impl Document {
    /// Entities reached through the resolved `tag` references of `entity`
    fn linked_entities(&self, entity: NodeId, tag: &str) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for child in self.node(entity)?.children() {
            let node = self.node(*child)?;
            if node.tag() != tag {
                continue;
            }
            if let Some(target) = node.cross_ref().and_then(CrossRef::target) {
                let owner = self.entity_of(target)?;
                if !out.contains(&owner) {
                    out.push(owner);
                }
            }
        }
        Ok(out)
    }

    /// Linked husband of a family
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the family is not part of the document.
    pub fn husband(&self, family: NodeId) -> Result<Option<NodeId>> {
        Ok(self.linked_entities(family, "HUSB")?.into_iter().next())
    }

    /// Linked wife of a family
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the family is not part of the document.
    pub fn wife(&self, family: NodeId) -> Result<Option<NodeId>> {
        Ok(self.linked_entities(family, "WIFE")?.into_iter().next())
    }

    /// Linked children of a family, in `CHIL` order
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the family is not part of the document.
    pub fn children(&self, family: NodeId) -> Result<Vec<NodeId>> {
        self.linked_entities(family, "CHIL")
    }

    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn families_where_spouse(&self, individual: NodeId) -> Result<Vec<NodeId>> {
        self.linked_entities(individual, "FAMS")
    }

    /// Parent families through direct `FAMC` references; adoptions are not
    /// included
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn families_where_child(&self, individual: NodeId) -> Result<Vec<NodeId>> {
        self.linked_entities(individual, "FAMC")
    }

    /// Other spouses across every family the individual is a spouse in
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn partners(&self, individual: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for family in self.families_where_spouse(individual)? {
            for spouse in [self.husband(family)?, self.wife(family)?].into_iter().flatten() {
                if spouse != individual && !out.contains(&spouse) {
                    out.push(spouse);
                }
            }
        }
        Ok(out)
    }

    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn father(&self, individual: NodeId) -> Result<Option<NodeId>> {
        match self.families_where_child(individual)?.first() {
            Some(family) => self.husband(*family),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn mother(&self, individual: NodeId) -> Result<Option<NodeId>> {
        match self.families_where_child(individual)?.first() {
            Some(family) => self.wife(*family),
            None => Ok(None),
        }
    }

    /// Other children of the individual's parent families
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn siblings(&self, individual: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for family in self.families_where_child(individual)? {
            for child in self.children(family)? {
                if child != individual && !out.contains(&child) {
                    out.push(child);
                }
            }
        }
        Ok(out)
    }

    /// Every individual reachable through parent families, nearest first
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn ancestors(&self, individual: NodeId) -> Result<Vec<NodeId>> {
        let mut seen = BTreeSet::from([individual]);
        let mut out = Vec::new();
        let mut frontier = vec![individual];
        while let Some(current) = pop_front(&mut frontier) {
            for family in self.families_where_child(current)? {
                for parent in [self.husband(family)?, self.wife(family)?].into_iter().flatten() {
                    if seen.insert(parent) {
                        out.push(parent);
                        frontier.push(parent);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Every individual reachable through families where spouse, nearest
    /// first
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn descendants(&self, individual: NodeId) -> Result<Vec<NodeId>> {
        let mut seen = BTreeSet::from([individual]);
        let mut out = Vec::new();
        let mut frontier = vec![individual];
        while let Some(current) = pop_front(&mut frontier) {
            for family in self.families_where_spouse(current)? {
                for child in self.children(family)? {
                    if seen.insert(child) {
                        out.push(child);
                        frontier.push(child);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Children of the family and all their descendants
    pub(crate) fn family_descendants(&self, family: NodeId) -> Result<BTreeSet<NodeId>> {
        let mut out = BTreeSet::new();
        for child in self.children(family)? {
            out.insert(child);
            out.extend(self.descendants(child)?);
        }
        Ok(out)
    }

    /// Spouses of the family and all their ancestors
    pub(crate) fn family_ancestors(&self, family: NodeId) -> Result<BTreeSet<NodeId>> {
        let mut out = BTreeSet::new();
        for spouse in [self.husband(family)?, self.wife(family)?].into_iter().flatten() {
            out.insert(spouse);
            out.extend(self.ancestors(spouse)?);
        }
        Ok(out)
    }

    /// Start of the first parseable `BIRT:DATE`
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn birth_date(&self, individual: NodeId) -> Result<Option<PointInTime>> {
        for birth in self.node(individual)?.children() {
            let birth = self.node(*birth)?;
            if birth.tag() != "BIRT" {
                continue;
            }
            for date in birth.children() {
                if let Some(start) = self.node(*date)?.date().and_then(|d| d.start()) {
                    return Ok(Some(*start));
                }
            }
        }
        Ok(None)
    }

    /// Age of an individual at a point in time
    ///
    /// `None` without a usable birth date, or when the point is in another
    /// calendar or before the birth.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the individual is not part of the document.
    pub fn age_at(&self, individual: NodeId, at: &PointInTime) -> Result<Option<Delta>> {
        let Some(birth) = self.birth_date(individual)? else {
            return Ok(None);
        };
        if birth.compare(at) == Some(Ordering::Greater) {
            return Ok(None);
        }
        Ok(Delta::between(&birth, at))
    }
}

fn pop_front(queue: &mut Vec<NodeId>) -> Option<NodeId> {
    if queue.is_empty() {
        None
    } else {
        Some(queue.remove(0))
    }
}
