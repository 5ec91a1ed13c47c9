use crate::document::Document;
use crate::errors::{GedcomError, Result};

use super::invariants;

/// Validate a whole document
///
/// Runs every integrity checker and fails on the first violation. For
/// exhaustive reporting call [`invariants::check_all`] directly.
///
/// # Errors
///
/// Returns `StructuralConsistency` describing the first violation found.
pub fn validate_document(doc: &Document) -> Result<()> {
    match invariants::check_all(doc).into_iter().next() {
        Some(violation) => Err(GedcomError::StructuralConsistency {
            reason: violation.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EntityType;

    #[test]
    fn test_validate_reports_first_violation() {
        let mut doc = Document::new();
        let indi = doc.create_entity(EntityType::Individual, None).unwrap();
        doc.create_entity(EntityType::Family, Some("F1")).unwrap();
        let famc = doc.add_child(indi, "FAMC", "@F1@").unwrap();
        doc.link(famc).unwrap();
        assert!(validate_document(&doc).is_ok());

        let chil = doc.node(famc).unwrap().cross_ref().unwrap().target().unwrap();
        doc.raw_set_target(chil, None).unwrap();
        let err = validate_document(&doc).unwrap_err();
        assert!(err.to_string().contains("not reciprocated"));
    }
}
