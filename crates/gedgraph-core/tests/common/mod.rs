use gedgraph_core::rules::check_all;
use gedgraph_core::snapshot::document_digest;
use gedgraph_core::{Document, EntityType, NodeId};

/// Create a new empty Document for testing
#[allow(dead_code)]
pub fn new_document() -> Document {
    Document::new()
}

/// Create an individual with an explicit id and a SEX property
///
/// Pass an empty `sex` to leave the individual without one.
#[allow(dead_code)]
pub fn create_individual(doc: &mut Document, id: &str, sex: &str) -> NodeId {
    let indi = doc.create_entity(EntityType::Individual, Some(id)).unwrap();
    if !sex.is_empty() {
        doc.add_child(indi, "SEX", sex).unwrap();
    }
    indi
}

/// Create an empty family with an explicit id
#[allow(dead_code)]
pub fn create_family(doc: &mut Document, id: &str) -> NodeId {
    doc.create_entity(EntityType::Family, Some(id)).unwrap()
}

/// Add an `INDI:FAMS` reference to `family_id` and link it
#[allow(dead_code)]
pub fn link_spouse(doc: &mut Document, indi: NodeId, family_id: &str) -> NodeId {
    let fams = doc.add_child(indi, "FAMS", &format!("@{family_id}@")).unwrap();
    doc.link(fams).unwrap();
    fams
}

/// Add an `INDI:FAMC` reference to `family_id` and link it
#[allow(dead_code)]
pub fn link_child(doc: &mut Document, indi: NodeId, family_id: &str) -> NodeId {
    let famc = doc.add_child(indi, "FAMC", &format!("@{family_id}@")).unwrap();
    doc.link(famc).unwrap();
    famc
}

/// Reciprocal of a linked cross-reference
#[allow(dead_code)]
pub fn reciprocal(doc: &Document, xref: NodeId) -> NodeId {
    doc.node(xref)
        .unwrap()
        .cross_ref()
        .and_then(|x| x.target())
        .expect("cross-reference should be linked")
}

/// Structural digest of the document
#[allow(dead_code)]
pub fn digest(doc: &Document) -> String {
    document_digest(doc).unwrap()
}

/// Assert that no integrity checker reports a violation
#[allow(dead_code)]
pub fn assert_integrity(doc: &Document) {
    let violations = check_all(doc);
    assert!(violations.is_empty(), "integrity violations: {violations:?}");
}
