//! Entity lifecycle: creation, import, deletion, renaming

use crate::document::Document;
use crate::errors::{GedcomError, Result};
use crate::graph::{EntityType, Node, NodeId};
use crate::{log_op_end, log_op_error, log_op_start};

fn check_id(id: &str) -> Result<()> {
    let reason = if id.trim().is_empty() {
        "id cannot be empty or whitespace-only"
    } else if id.chars().any(char::is_whitespace) {
        "id cannot contain whitespace"
    } else if id.contains('@') {
        "id cannot contain '@'"
    } else {
        return Ok(());
    };
    Err(GedcomError::InvalidId {
        id: id.to_string(),
        reason: reason.to_string(),
    })
}

impl Document {
    /// Create an entity, generating an id when none is given
    ///
    /// Generated ids are the lowest free `{prefix}{n}` scanning upward from
    /// the current entity count, zero-padded to the document's id width.
    ///
    /// # Errors
    ///
    /// * `DuplicateId` - If the given id is already used by that type
    /// * `InvalidId` - If the given id is empty or malformed
    pub fn create_entity(&mut self, entity_type: EntityType, id: Option<&str>) -> Result<NodeId> {
        log_op_start!("create_entity", entity_type = entity_type.tag());
        let start = std::time::Instant::now();

        let entity = self.create_entity_impl(entity_type, id).map_err(|e| {
            log_op_error!(
                "create_entity",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "create_entity",
            duration_ms = start.elapsed().as_millis() as u64,
            entity_type = entity_type.tag(),
            entity_id = self.entity_meta(entity).map(|m| m.id.as_str()).unwrap_or_default()
        );
        Ok(entity)
    }

    fn create_entity_impl(&mut self, entity_type: EntityType, id: Option<&str>) -> Result<NodeId> {
        let id = match id {
            Some(id) => {
                let id = id.trim().trim_matches('@');
                check_id(id)?;
                if self.id_taken(entity_type, id) {
                    return Err(GedcomError::DuplicateId { id: id.to_string() });
                }
                id.to_string()
            }
            None => self.generate_id(entity_type),
        };
        self.attach_entity(entity_type, id)
    }

    /// Add an entity whose id may already be taken
    ///
    /// Used when loading stored documents: duplicate ids are tracked and make
    /// lookups of that id fail with `AmbiguousId` until resolved.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` for an empty or malformed id.
    pub fn import_entity(&mut self, entity_type: EntityType, id: &str) -> Result<NodeId> {
        let id = id.trim().trim_matches('@');
        check_id(id)?;
        if self.id_taken(entity_type, id) {
            tracing::warn!(
                component = module_path!(),
                op = "import_entity",
                entity_type = entity_type.tag(),
                entity_id = id,
                "duplicate entity id"
            );
        }
        self.attach_entity(entity_type, id.to_string())
    }

    fn attach_entity(&mut self, entity_type: EntityType, id: String) -> Result<NodeId> {
        self.min_id_width = self.min_id_width.max(id.len());
        let entity = self.arena.alloc(Node::entity(entity_type, id));
        self.raw_add_entity(entity)?;
        Ok(entity)
    }

    fn id_taken(&self, entity_type: EntityType, id: &str) -> bool {
        self.indexes.get(&entity_type).is_some_and(|index| index.contains(id))
    }

    /// Lowest free id for a type
    pub(crate) fn generate_id(&self, entity_type: EntityType) -> String {
        let prefix = entity_type.id_prefix();
        let width = self.min_id_width;
        let mut n = self.entity_count(entity_type);
        'search: loop {
            n += 1;
            let mut suffix = n.to_string();
            let mut candidate = format!("{prefix}{suffix}");
            while candidate.len() < width {
                // the unpadded spelling must be free as well
                if self.id_taken(entity_type, &candidate) {
                    continue 'search;
                }
                suffix.insert(0, '0');
                candidate = format!("{prefix}{suffix}");
            }
            if !self.id_taken(entity_type, &candidate) {
                return candidate;
            }
        }
    }

    /// Delete an entity after unlinking every reference into or out of it
    ///
    /// # Errors
    ///
    /// * `NodeNotFound` - If the node is not part of the document
    /// * `EntityNotFound` - If the node is not an indexed entity
    pub fn delete_entity(&mut self, entity: NodeId) -> Result<()> {
        log_op_start!("delete_entity");
        let start = std::time::Instant::now();

        let id = self.delete_entity_impl(entity).map_err(|e| {
            log_op_error!(
                "delete_entity",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "delete_entity",
            duration_ms = start.elapsed().as_millis() as u64,
            entity_id = id.as_str()
        );
        Ok(())
    }

    fn delete_entity_impl(&mut self, entity: NodeId) -> Result<String> {
        let meta = self
            .slot(entity)?
            .entity_meta()
            .cloned()
            .ok_or_else(|| GedcomError::EntityNotFound {
                id: entity.to_string(),
            })?;
        let indexed = self
            .indexes
            .get(&meta.entity_type)
            .is_some_and(|index| index.holds(&meta.id, entity));
        if !self.contains(entity) || !indexed {
            return Err(GedcomError::EntityNotFound { id: meta.id });
        }
        self.cascade_unlink(entity)?;
        if self.submitter == Some(entity) {
            self.raw_set_submitter(None);
        }
        self.raw_remove_entity(entity)?;
        Ok(meta.id)
    }

    /// Give an entity a new id
    ///
    /// Every linked cross-reference that names the entity is rewritten to
    /// the new id.
    ///
    /// # Errors
    ///
    /// * `InvalidId` - If the id is empty, malformed or unchanged
    /// * `DuplicateId` - If another entity of the type uses the id
    pub fn rename_entity(&mut self, entity: NodeId, new_id: &str) -> Result<()> {
        log_op_start!("rename_entity", entity_id = new_id);
        let start = std::time::Instant::now();

        self.rename_entity_impl(entity, new_id).map_err(|e| {
            log_op_error!(
                "rename_entity",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "rename_entity",
            duration_ms = start.elapsed().as_millis() as u64,
            entity_id = new_id
        );
        Ok(())
    }

    fn rename_entity_impl(&mut self, entity: NodeId, new_id: &str) -> Result<()> {
        let meta = self.entity_meta(entity)?.clone();
        let new_id = new_id.trim().trim_matches('@');
        check_id(new_id)?;
        if new_id == meta.id {
            return Err(GedcomError::InvalidId {
                id: new_id.to_string(),
                reason: "id is unchanged".to_string(),
            });
        }
        if self.id_taken(meta.entity_type, new_id) {
            return Err(GedcomError::DuplicateId {
                id: new_id.to_string(),
            });
        }

        // reciprocals on other entities hold the textual id
        let mut rewrites = Vec::new();
        for node in self.subtree(entity)? {
            if let Some(target) = self.slot(node)?.cross_ref().and_then(|x| x.target()) {
                if let Some(xref) = self.slot(target)?.cross_ref() {
                    let mut renamed = xref.clone();
                    renamed.target_id = new_id.to_string();
                    rewrites.push((target, renamed));
                }
            }
        }

        self.raw_rename(entity, new_id)?;
        for (target, xref) in rewrites {
            self.raw_set_payload(target, crate::graph::Payload::CrossRef(xref))?;
        }
        Ok(())
    }

    /// Designate the document's submitter
    ///
    /// # Errors
    ///
    /// * `EntityNotFound` - If the node is not an entity
    /// * `StructuralConsistency` - If the entity is not a submitter record
    pub fn set_submitter(&mut self, submitter: Option<NodeId>) -> Result<()> {
        if let Some(entity) = submitter {
            let meta = self.entity_meta(entity)?;
            if meta.entity_type != EntityType::Submitter {
                return Err(GedcomError::StructuralConsistency {
                    reason: format!("{} is not a submitter record", meta.id),
                });
            }
        }
        if self.submitter != submitter {
            self.raw_set_submitter(submitter);
        }
        Ok(())
    }
}
