#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use gedgraph_core::document::linker::FOREIGN_MARKER_TAG;
use gedgraph_core::{EntityType, GedcomError, XRefKind};

#[test]
fn test_link_creates_exactly_one_reciprocal() {
    // GIVEN an individual referencing a family
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "M");
    let fam = create_family(&mut doc, "F1");

    // WHEN the reference is linked
    let fams = link_spouse(&mut doc, indi, "F1");

    // THEN exactly one reciprocal exists and points back
    let husb = reciprocal(&doc, fams);
    assert_eq!(doc.node(fam).unwrap().children(), &[husb]);
    assert_eq!(reciprocal(&doc, husb), fams);
    assert_eq!(doc.node(husb).unwrap().cross_ref().unwrap().kind(), XRefKind::Husband);
    assert_integrity(&doc);
}

#[test]
fn test_relinking_is_a_no_op() {
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "M");
    let fam = create_family(&mut doc, "F1");
    let fams = link_spouse(&mut doc, indi, "F1");
    let before = digest(&doc);

    doc.link(fams).unwrap();

    assert_eq!(digest(&doc), before);
    assert_eq!(doc.node(fam).unwrap().children().len(), 1);
}

#[test]
fn test_deleting_origin_removes_reciprocal() {
    // GIVEN a linked FAMS/HUSB pair
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "M");
    let fam = create_family(&mut doc, "F1");
    let fams = link_spouse(&mut doc, indi, "F1");

    // WHEN the FAMS property is removed
    let removed = doc.remove_child(indi, fams).unwrap();

    // THEN the HUSB reciprocal is gone too, and removing again is false
    assert!(removed);
    assert!(doc.node(fam).unwrap().children().is_empty());
    assert!(!doc.remove_child(indi, fams).unwrap());
    assert_integrity(&doc);
}

#[test]
fn test_deleting_reciprocal_removes_origin() {
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "M");
    let fam = create_family(&mut doc, "F1");
    let fams = link_spouse(&mut doc, indi, "F1");
    let husb = reciprocal(&doc, fams);

    assert!(doc.remove_child(fam, husb).unwrap());

    assert!(!doc.contains(fams));
    assert!(doc.families_where_spouse(indi).unwrap().is_empty());
    assert!(!doc.remove_child(fam, husb).unwrap());
    assert_integrity(&doc);
}

#[test]
fn test_deleting_nested_owner_cascades() {
    // GIVEN a source citation nested under an event
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "");
    let source = doc.create_entity(EntityType::Source, Some("S1")).unwrap();
    let birth = doc.add_child(indi, "BIRT", "").unwrap();
    let citation = doc.add_child(birth, "SOUR", "@S1@").unwrap();
    doc.link(citation).unwrap();
    let marker = reciprocal(&doc, citation);
    assert_eq!(doc.node(marker).unwrap().tag(), FOREIGN_MARKER_TAG);

    // WHEN the event is removed
    doc.remove_child(indi, birth).unwrap();

    // THEN the backlink marker on the source is removed as well
    assert!(doc.node(source).unwrap().children().is_empty());
    assert!(!doc.contains(marker));
    assert_integrity(&doc);
}

#[test]
fn test_rename_rewrites_reference_text() {
    // GIVEN a note referenced from an individual
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "");
    let note = doc.create_entity(EntityType::Note, Some("N1")).unwrap();
    let reference = doc.add_child(indi, "NOTE", "@N1@").unwrap();
    doc.link(reference).unwrap();

    // WHEN the note is renamed
    doc.rename_entity(note, "N42").unwrap();

    // THEN the reference names the new id and stays linked
    assert_eq!(doc.node(reference).unwrap().value(), "@N42@");
    assert_eq!(doc.entity(EntityType::Note, "N42").unwrap(), Some(note));
    assert_eq!(doc.entity(EntityType::Note, "N1").unwrap(), None);
    assert!(doc.node(reference).unwrap().is_valid());
    assert_integrity(&doc);
}

#[test]
fn test_linked_reference_value_is_protected() {
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "M");
    create_family(&mut doc, "F1");
    create_family(&mut doc, "F2");
    let fams = link_spouse(&mut doc, indi, "F1");

    assert!(matches!(
        doc.set_value(fams, "@F2@"),
        Err(GedcomError::ReferenceLinked { .. })
    ));

    doc.unlink(fams).unwrap();
    doc.set_value(fams, "@F2@").unwrap();
    doc.link(fams).unwrap();
    assert_eq!(doc.node(reciprocal(&doc, fams)).unwrap().value(), "@I1@");
    assert_integrity(&doc);
}

#[test]
fn test_ambiguous_target_is_reported() {
    let mut doc = new_document();
    doc.import_entity(EntityType::Family, "F1").unwrap();
    doc.import_entity(EntityType::Family, "F1").unwrap();
    let indi = create_individual(&mut doc, "I1", "M");
    let fams = doc.add_child(indi, "FAMS", "@F1@").unwrap();

    assert_eq!(
        doc.link(fams),
        Err(GedcomError::AmbiguousId {
            id: "F1".to_string(),
            count: 2
        })
    );
    assert_eq!(doc.duplicate_ids(EntityType::Family), vec!["F1".to_string()]);
}

#[test]
fn test_inline_note_and_source_text_is_kept_verbatim() {
    // GIVEN an individual with inline NOTE and SOUR text next to a pointer
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "F");
    doc.create_entity(EntityType::Note, Some("N1")).unwrap();
    let inline_note = doc.add_child(indi, "NOTE", "Born in Paris").unwrap();
    let inline_source = doc.add_child(indi, "SOUR", "Parish register, St. Roch").unwrap();
    let pointer = doc.add_child(indi, "NOTE", "@N1@").unwrap();

    // WHEN every reference is linked
    let failures = doc.link_all();

    // THEN the inline text is untouched and only the pointer was linked
    assert!(failures.is_empty(), "unexpected failures {failures:?}");
    let note = doc.node(inline_note).unwrap();
    assert_eq!(note.value(), "Born in Paris");
    assert!(note.is_valid());
    assert!(note.cross_ref().is_none());
    assert_eq!(doc.node(inline_source).unwrap().value(), "Parish register, St. Roch");
    assert!(doc.node(pointer).unwrap().cross_ref().unwrap().is_resolved());
    assert_integrity(&doc);
}
