//! Cross-reference linking
//!
//! Linking binds a textual reference to a reciprocal node inside the
//! target entity: an existing unresolved candidate when the stored document
//! already spells out both halves, otherwise a newly created one. Family
//! links are validated against the family rules before anything changes.

use crate::document::Document;
use crate::errors::{GedcomError, Result};
use crate::graph::{CrossRef, EntityType, Node, NodeId, Payload, SexValue, XRefKind};
use crate::{log_op_end, log_op_error, log_op_start};

/// Tag of backlink markers created for generic references
pub const FOREIGN_MARKER_TAG: &str = "XREF";

/// What linking will do once validated
#[derive(Debug, Clone, PartialEq)]
enum LinkPlan {
    /// Bind to an existing unresolved reciprocal
    Bind(NodeId),
    /// Append a new reciprocal to `entity`
    Create {
        entity: NodeId,
        tag: &'static str,
        kind: XRefKind,
    },
}

fn conflict(reason: String) -> GedcomError {
    GedcomError::StructuralConsistency { reason }
}

impl Document {
    /// Resolve a cross-reference and connect its reciprocal
    ///
    /// Already linked references, empty references and backlink markers
    /// are left alone.
    ///
    /// # Errors
    ///
    /// * `NodeNotFound` - If the node is not part of the document
    /// * `TargetNotFound` - If no entity has the referenced id
    /// * `AmbiguousId` - If several entities have the referenced id
    /// * `StructuralConsistency` - If a family rule would be broken
    pub fn link(&mut self, node: NodeId) -> Result<()> {
        log_op_start!("link");
        let start = std::time::Instant::now();

        self.link_impl(node).map_err(|e| {
            log_op_error!("link", e.clone(), duration_ms = start.elapsed().as_millis() as u64);
            e
        })?;

        log_op_end!("link", duration_ms = start.elapsed().as_millis() as u64);
        Ok(())
    }

    fn link_impl(&mut self, node: NodeId) -> Result<()> {
        let xref = self.node(node)?.cross_ref().cloned().ok_or_else(|| {
            conflict(format!("node {node} is not a cross-reference"))
        })?;
        if xref.is_resolved() || xref.target_id().is_empty() {
            return Ok(());
        }
        let Some(target_type) = xref.kind().target_type() else {
            return Ok(());
        };
        let target = self
            .entity(target_type, xref.target_id())?
            .ok_or_else(|| GedcomError::TargetNotFound {
                id: xref.target_id().to_string(),
            })?;

        let reciprocal = match self.plan_link(node, &xref, target)? {
            LinkPlan::Bind(reciprocal) => reciprocal,
            LinkPlan::Create { entity, tag, kind } => {
                let origin = self.entity_of(node)?;
                let origin_id = self.entity_meta(origin)?.id.clone();
                let created = self.arena.alloc(Node::new(tag, Payload::CrossRef(CrossRef::new(kind, &origin_id))));
                let position = self.node(entity)?.children().len();
                self.raw_insert(entity, position, created)?;
                created
            }
        };
        self.raw_set_target(node, Some(reciprocal))?;
        self.raw_set_target(reciprocal, Some(node))?;
        Ok(())
    }

    /// Validate a link and decide how to complete it, without mutating
    fn plan_link(&self, node: NodeId, xref: &CrossRef, target: NodeId) -> Result<LinkPlan> {
        let origin = self.entity_of(node)?;
        let origin_type = self.entity_meta(origin)?.entity_type;
        let expected = match xref.kind() {
            XRefKind::FamilySpouse | XRefKind::FamilyChild => Some(EntityType::Individual),
            XRefKind::Husband | XRefKind::Wife | XRefKind::Child => Some(EntityType::Family),
            _ => None,
        };
        if let Some(expected) = expected {
            if origin_type != expected {
                return Err(conflict(format!(
                    "{} must be inside a {} record",
                    self.node(node)?.tag(),
                    expected
                )));
            }
        }

        match xref.kind() {
            XRefKind::FamilySpouse => self.plan_spouse_in_family(origin, target),
            XRefKind::FamilyChild => {
                let adoption = self
                    .node(node)?
                    .parent()
                    .is_some_and(|p| self.node(p).is_ok_and(|n| n.tag() == "ADOP"));
                self.plan_child_of_family(origin, target, adoption)
            }
            XRefKind::Husband => self.plan_family_spouse(origin, target, XRefKind::Husband),
            XRefKind::Wife => self.plan_family_spouse(origin, target, XRefKind::Wife),
            XRefKind::Child => self.plan_family_child(origin, target),
            XRefKind::Reference(_) | XRefKind::Foreign => Ok(LinkPlan::Create {
                entity: target,
                tag: FOREIGN_MARKER_TAG,
                kind: XRefKind::Foreign,
            }),
        }
    }

    fn id_of(&self, entity: NodeId) -> String {
        self.entity_meta(entity).map(|m| m.id.clone()).unwrap_or_default()
    }

    /// Unresolved direct child of `entity` with `tag` naming `id`
    fn candidate(&self, entity: NodeId, tag: &str, id: &str) -> Result<Option<NodeId>> {
        for child in self.node(entity)?.children() {
            let node = self.node(*child)?;
            if node.tag() != tag {
                continue;
            }
            if let Some(xref) = node.cross_ref() {
                if !xref.is_resolved() && xref.target_id() == id {
                    return Ok(Some(*child));
                }
            }
        }
        Ok(None)
    }

    /// `INDI:FAMS` from `indi` to `fam`
    fn plan_spouse_in_family(&self, indi: NodeId, fam: NodeId) -> Result<LinkPlan> {
        let (indi_id, fam_id) = (self.id_of(indi), self.id_of(fam));
        let husband = self.husband(fam)?;
        let wife = self.wife(fam)?;
        if husband.is_some() && wife.is_some() {
            return Err(conflict(format!("family @{fam_id}@ already has husband and wife")));
        }
        if husband == Some(indi) || wife == Some(indi) {
            return Err(conflict(format!("@{indi_id}@ is already spouse in family @{fam_id}@")));
        }
        if self.children(fam)?.contains(&indi) {
            return Err(conflict(format!("@{indi_id}@ is already child in family @{fam_id}@")));
        }
        if self.family_descendants(fam)?.contains(&indi) {
            return Err(conflict(format!("@{indi_id}@ is a descendant of family @{fam_id}@")));
        }

        if let Some(existing) = self.candidate(fam, "HUSB", &indi_id)? {
            if husband.is_some() {
                return Err(conflict(format!("family @{fam_id}@ can't have two husbands")));
            }
            return Ok(LinkPlan::Bind(existing));
        }
        if let Some(existing) = self.candidate(fam, "WIFE", &indi_id)? {
            if wife.is_some() {
                return Err(conflict(format!("family @{fam_id}@ can't have two wives")));
            }
            return Ok(LinkPlan::Bind(existing));
        }

        let sex = self.sex_of(indi)?;
        let role = match sex {
            Some(SexValue::Male) => XRefKind::Husband,
            Some(SexValue::Female) => XRefKind::Wife,
            _ if wife.is_none() => XRefKind::Wife,
            _ => XRefKind::Husband,
        };
        let (tag, taken) = match role {
            XRefKind::Husband => ("HUSB", husband.is_some()),
            _ => ("WIFE", wife.is_some()),
        };
        if taken {
            return Err(conflict(format!("family @{fam_id}@ already has a {tag} role filled")));
        }
        Ok(LinkPlan::Create {
            entity: fam,
            tag,
            kind: role,
        })
    }

    /// `INDI:FAMC` (or `ADOP:FAMC`) from `indi` to `fam`
    fn plan_child_of_family(&self, indi: NodeId, fam: NodeId, adoption: bool) -> Result<LinkPlan> {
        let (indi_id, fam_id) = (self.id_of(indi), self.id_of(fam));
        if !adoption {
            if !self.families_where_child(indi)?.is_empty() {
                return Err(conflict(format!("@{indi_id}@ is already child of a family")));
            }
            if self.children(fam)?.contains(&indi) {
                return Err(conflict(format!("family @{fam_id}@ already has @{indi_id}@ as a child")));
            }
        }
        if self.husband(fam)? == Some(indi) || self.wife(fam)? == Some(indi) {
            return Err(conflict(format!("@{indi_id}@ is already spouse in family @{fam_id}@")));
        }
        if self.family_ancestors(fam)?.contains(&indi) {
            return Err(conflict(format!("@{indi_id}@ is an ancestor of family @{fam_id}@")));
        }

        if adoption {
            return Ok(LinkPlan::Create {
                entity: fam,
                tag: FOREIGN_MARKER_TAG,
                kind: XRefKind::Foreign,
            });
        }
        if let Some(existing) = self.candidate(fam, "CHIL", &indi_id)? {
            return Ok(LinkPlan::Bind(existing));
        }
        Ok(LinkPlan::Create {
            entity: fam,
            tag: "CHIL",
            kind: XRefKind::Child,
        })
    }

    /// `FAM:HUSB` or `FAM:WIFE` from `fam` to `indi`
    fn plan_family_spouse(&self, fam: NodeId, indi: NodeId, role: XRefKind) -> Result<LinkPlan> {
        let (indi_id, fam_id) = (self.id_of(indi), self.id_of(fam));
        let (current, other) = match role {
            XRefKind::Husband => (self.husband(fam)?, self.wife(fam)?),
            _ => (self.wife(fam)?, self.husband(fam)?),
        };
        if current.is_some() {
            return Err(conflict(format!("family @{fam_id}@ can't have two spouses in the same role")));
        }
        if other == Some(indi) {
            return Err(conflict(format!("@{indi_id}@ is already the other spouse in family @{fam_id}@")));
        }
        if self.family_descendants(fam)?.contains(&indi) {
            return Err(conflict(format!("@{indi_id}@ is a descendant of family @{fam_id}@")));
        }
        if let Some(existing) = self.candidate(indi, "FAMS", &fam_id)? {
            return Ok(LinkPlan::Bind(existing));
        }
        Ok(LinkPlan::Create {
            entity: indi,
            tag: "FAMS",
            kind: XRefKind::FamilySpouse,
        })
    }

    /// `FAM:CHIL` from `fam` to `child`
    fn plan_family_child(&self, fam: NodeId, child: NodeId) -> Result<LinkPlan> {
        let (child_id, fam_id) = (self.id_of(child), self.id_of(fam));
        if !self.families_where_child(child)?.is_empty() {
            return Err(conflict(format!("@{child_id}@ is already child of a family")));
        }
        if self.husband(fam)? == Some(child) || self.wife(fam)? == Some(child) {
            return Err(conflict(format!("@{child_id}@ is already spouse in family @{fam_id}@")));
        }
        if self.children(fam)?.contains(&child) {
            return Err(conflict(format!("@{child_id}@ is already child in family @{fam_id}@")));
        }
        if self.family_ancestors(fam)?.contains(&child) {
            return Err(conflict(format!("@{child_id}@ is an ancestor of family @{fam_id}@")));
        }
        if let Some(existing) = self.candidate(child, "FAMC", &fam_id)? {
            return Ok(LinkPlan::Bind(existing));
        }
        Ok(LinkPlan::Create {
            entity: child,
            tag: "FAMC",
            kind: XRefKind::FamilyChild,
        })
    }

    /// Link every unresolved reference in the document
    ///
    /// Failures do not stop the pass; they are returned per node.
    pub fn link_all(&mut self) -> Vec<(NodeId, GedcomError)> {
        log_op_start!("link_all");
        let start = std::time::Instant::now();

        let mut pending = Vec::new();
        for entity_type in EntityType::ALL {
            for entity in self.entities(entity_type) {
                let Ok(nodes) = self.subtree(*entity) else {
                    continue;
                };
                pending.extend(nodes.into_iter().filter(|n| {
                    self.node(*n)
                        .ok()
                        .and_then(Node::cross_ref)
                        .is_some_and(|x| !x.is_resolved() && !x.target_id().is_empty())
                }));
            }
        }

        let mut failures = Vec::new();
        for node in pending {
            if let Err(err) = self.link_impl(node) {
                failures.push((node, err));
            }
        }

        log_op_end!(
            "link_all",
            duration_ms = start.elapsed().as_millis() as u64,
            failure_count = failures.len()
        );
        failures
    }

    /// Break a linked pair
    ///
    /// Both halves become unresolved; a backlink marker on either side is
    /// removed. Returns false when the node was not linked.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` when the node is not part of the document.
    pub fn unlink(&mut self, node: NodeId) -> Result<bool> {
        let Some(target) = self.node(node)?.cross_ref().and_then(CrossRef::target) else {
            return Ok(false);
        };
        self.raw_set_target(node, None)?;
        if self.contains(target) {
            self.raw_set_target(target, None)?;
        }
        for half in [target, node] {
            let is_marker = self
                .node(half)
                .ok()
                .and_then(Node::cross_ref)
                .is_some_and(|x| x.kind() == XRefKind::Foreign);
            if is_marker {
                if let Some(parent) = self.node(half)?.parent() {
                    self.raw_remove(parent, half)?;
                }
            }
        }
        Ok(true)
    }

    /// Clear every linked pair in the subtree, deleting the far halves
    pub(crate) fn cascade_unlink(&mut self, root: NodeId) -> Result<()> {
        for node in self.subtree(root)? {
            let Some(target) = self.slot(node)?.cross_ref().and_then(CrossRef::target) else {
                continue;
            };
            self.raw_set_target(node, None)?;
            if !self.contains(target) {
                continue;
            }
            self.raw_set_target(target, None)?;
            if let Some(parent) = self.node(target)?.parent() {
                self.delete_subtree(parent, target)?;
            }
        }
        Ok(())
    }

    /// Unlink and detach `child` from `parent`
    pub(crate) fn delete_subtree(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.cascade_unlink(child)?;
        self.raw_remove(parent, child)
    }

    fn sex_of(&self, indi: NodeId) -> Result<Option<SexValue>> {
        for child in self.node(indi)?.children() {
            if let Some(sex) = self.node(*child)?.sex() {
                return Ok(Some(sex.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(doc: &mut Document, sex: &str) -> NodeId {
        let indi = doc.create_entity(EntityType::Individual, None).unwrap();
        doc.add_child(indi, "SEX", sex).unwrap();
        indi
    }

    fn link_spouse(doc: &mut Document, indi: NodeId, fam: NodeId) -> Result<NodeId> {
        let id = doc.entity_meta(fam).unwrap().id.clone();
        let fams = doc.add_child(indi, "FAMS", &format!("@{id}@")).unwrap();
        doc.link(fams).map(|_| fams)
    }

    #[test]
    fn test_fams_creates_role_by_sex() {
        let mut doc = Document::new();
        let man = person(&mut doc, "M");
        let fam = doc.create_entity(EntityType::Family, None).unwrap();
        let fams = link_spouse(&mut doc, man, fam).unwrap();

        let husb = doc.node(fams).unwrap().cross_ref().unwrap().target().unwrap();
        assert_eq!(doc.node(husb).unwrap().tag(), "HUSB");
        assert_eq!(doc.node(husb).unwrap().cross_ref().unwrap().target(), Some(fams));
        assert_eq!(doc.husband(fam).unwrap(), Some(man));
    }

    #[test]
    fn test_unknown_sex_takes_wife_slot_first() {
        let mut doc = Document::new();
        let a = person(&mut doc, "U");
        let b = person(&mut doc, "");
        let fam = doc.create_entity(EntityType::Family, None).unwrap();
        link_spouse(&mut doc, a, fam).unwrap();
        link_spouse(&mut doc, b, fam).unwrap();
        assert_eq!(doc.wife(fam).unwrap(), Some(a));
        assert_eq!(doc.husband(fam).unwrap(), Some(b));
    }

    #[test]
    fn test_existing_reciprocal_is_reused() {
        let mut doc = Document::new();
        let man = doc.create_entity(EntityType::Individual, Some("I1")).unwrap();
        let fam = doc.create_entity(EntityType::Family, Some("F1")).unwrap();
        let husb = doc.add_child(fam, "HUSB", "@I1@").unwrap();
        let fams = doc.add_child(man, "FAMS", "@F1@").unwrap();

        doc.link(fams).unwrap();
        assert_eq!(doc.node(fams).unwrap().cross_ref().unwrap().target(), Some(husb));
        assert_eq!(doc.node(fam).unwrap().children().len(), 1);
        // the other half is already resolved now
        doc.link(husb).unwrap();
        assert_eq!(doc.node(man).unwrap().children().len(), 1);
    }

    #[test]
    fn test_missing_target() {
        let mut doc = Document::new();
        let indi = doc.create_entity(EntityType::Individual, None).unwrap();
        let famc = doc.add_child(indi, "FAMC", "@F404@").unwrap();
        assert_eq!(
            doc.link(famc),
            Err(GedcomError::TargetNotFound { id: "F404".to_string() })
        );
        assert!(!doc.node(famc).unwrap().is_valid());
    }

    #[test]
    fn test_generic_reference_gets_marker() {
        let mut doc = Document::new();
        let indi = doc.create_entity(EntityType::Individual, Some("I1")).unwrap();
        let note = doc.create_entity(EntityType::Note, Some("N1")).unwrap();
        let reference = doc.add_child(indi, "NOTE", "@N1@").unwrap();
        doc.link(reference).unwrap();

        let marker = doc.node(reference).unwrap().cross_ref().unwrap().target().unwrap();
        let marker_node = doc.node(marker).unwrap();
        assert_eq!(marker_node.tag(), FOREIGN_MARKER_TAG);
        assert_eq!(marker_node.parent(), Some(note));
        assert_eq!(marker_node.value(), "@I1@");

        // deleting the note removes the reference that pointed at it
        doc.delete_entity(note).unwrap();
        assert!(doc.node(indi).unwrap().children().is_empty());
    }

    #[test]
    fn test_unlink_keeps_family_halves() {
        let mut doc = Document::new();
        let man = person(&mut doc, "M");
        let fam = doc.create_entity(EntityType::Family, None).unwrap();
        let fams = link_spouse(&mut doc, man, fam).unwrap();

        assert!(doc.unlink(fams).unwrap());
        assert!(!doc.unlink(fams).unwrap());
        assert_eq!(doc.husband(fam).unwrap(), None);
        // both halves are candidates again
        doc.link(fams).unwrap();
        assert_eq!(doc.husband(fam).unwrap(), Some(man));
        assert_eq!(doc.node(fam).unwrap().children().len(), 1);
    }

    #[test]
    fn test_adoption_is_exempt_from_single_parent_family() {
        let mut doc = Document::new();
        let child = doc.create_entity(EntityType::Individual, Some("I1")).unwrap();
        let birth_family = doc.create_entity(EntityType::Family, Some("F1")).unwrap();
        doc.create_entity(EntityType::Family, Some("F2")).unwrap();
        let famc = doc.add_child(child, "FAMC", "@F1@").unwrap();
        doc.link(famc).unwrap();
        assert_eq!(doc.children(birth_family).unwrap(), vec![child]);

        let adop = doc.add_child(child, "ADOP", "").unwrap();
        let adoptive = doc.add_child(adop, "FAMC", "@F2@").unwrap();
        doc.link(adoptive).unwrap();
        assert_eq!(doc.families_where_child(child).unwrap(), vec![birth_family]);

        let second = doc.add_child(child, "FAMC", "@F2@").unwrap();
        assert!(matches!(doc.link(second), Err(GedcomError::StructuralConsistency { .. })));
    }

    #[test]
    fn test_link_all_reports_failures() {
        let mut doc = Document::new();
        let a = doc.import_entity(EntityType::Individual, "I1").unwrap();
        let fam = doc.import_entity(EntityType::Family, "F1").unwrap();
        doc.add_child(a, "FAMS", "@F1@").unwrap();
        doc.add_child(fam, "HUSB", "@I1@").unwrap();
        let dangling = doc.add_child(fam, "CHIL", "@I9@").unwrap();

        let failures = doc.link_all();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, dangling);
        assert_eq!(doc.husband(fam).unwrap(), Some(a));
        assert_eq!(doc.node(fam).unwrap().children().len(), 2);
    }
}
