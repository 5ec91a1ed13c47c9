#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use gedgraph_core::{Document, GedcomError, NodeId};

fn assert_refused_unchanged(doc: &mut Document, node: NodeId) {
    let before = digest(doc);
    let result = doc.link(node);
    assert!(
        matches!(result, Err(GedcomError::StructuralConsistency { .. })),
        "expected StructuralConsistency, got {result:?}"
    );
    assert_eq!(digest(doc), before, "failed link must not change the graph");
}

#[test]
fn test_second_husband_is_refused() {
    // GIVEN a family that already has a husband
    let mut doc = new_document();
    let first = create_individual(&mut doc, "I1", "M");
    let second = create_individual(&mut doc, "I2", "M");
    let fam = create_family(&mut doc, "F1");
    link_spouse(&mut doc, first, "F1");

    // WHEN a second man links into the family
    let fams = doc.add_child(second, "FAMS", "@F1@").unwrap();

    // THEN the link fails and nothing changes
    assert_refused_unchanged(&mut doc, fams);
    assert_eq!(doc.husband(fam).unwrap(), Some(first));
    assert_integrity(&doc);
}

#[test]
fn test_second_wife_from_family_side_is_refused() {
    let mut doc = new_document();
    create_individual(&mut doc, "I1", "F");
    create_individual(&mut doc, "I2", "F");
    let fam = create_family(&mut doc, "F1");
    let wife = doc.add_child(fam, "WIFE", "@I1@").unwrap();
    doc.link(wife).unwrap();

    let second = doc.add_child(fam, "WIFE", "@I2@").unwrap();
    assert_refused_unchanged(&mut doc, second);
}

#[test]
fn test_full_family_is_refused() {
    let mut doc = new_document();
    let husband = create_individual(&mut doc, "I1", "M");
    let wife = create_individual(&mut doc, "I2", "F");
    let third = create_individual(&mut doc, "I3", "");
    create_family(&mut doc, "F1");
    link_spouse(&mut doc, husband, "F1");
    link_spouse(&mut doc, wife, "F1");

    let fams = doc.add_child(third, "FAMS", "@F1@").unwrap();
    assert_refused_unchanged(&mut doc, fams);
}

#[test]
fn test_spouse_cannot_be_child_of_same_family() {
    let mut doc = new_document();
    let person = create_individual(&mut doc, "I1", "M");
    create_family(&mut doc, "F1");
    link_spouse(&mut doc, person, "F1");

    let famc = doc.add_child(person, "FAMC", "@F1@").unwrap();
    assert_refused_unchanged(&mut doc, famc);
}

#[test]
fn test_child_cannot_have_two_parent_families() {
    let mut doc = new_document();
    let child = create_individual(&mut doc, "I1", "");
    create_family(&mut doc, "F1");
    let second_family = create_family(&mut doc, "F2");
    link_child(&mut doc, child, "F1");

    let chil = doc.add_child(second_family, "CHIL", "@I1@").unwrap();
    assert_refused_unchanged(&mut doc, chil);
}

#[test]
fn test_ancestor_cannot_become_child() {
    // GIVEN grandfather -> F1 -> father -> F2
    let mut doc = new_document();
    let grandfather = create_individual(&mut doc, "I1", "M");
    let father = create_individual(&mut doc, "I2", "M");
    create_family(&mut doc, "F1");
    create_family(&mut doc, "F2");
    link_spouse(&mut doc, grandfather, "F1");
    link_child(&mut doc, father, "F1");
    link_spouse(&mut doc, father, "F2");

    // WHEN the grandfather is made a child of F2
    let famc = doc.add_child(grandfather, "FAMC", "@F2@").unwrap();

    // THEN the cycle is refused
    assert_refused_unchanged(&mut doc, famc);
}

#[test]
fn test_descendant_cannot_become_spouse() {
    let mut doc = new_document();
    let father = create_individual(&mut doc, "I1", "M");
    let daughter = create_individual(&mut doc, "I2", "F");
    create_family(&mut doc, "F1");
    link_spouse(&mut doc, father, "F1");
    link_child(&mut doc, daughter, "F1");

    let fams = doc.add_child(daughter, "FAMS", "@F1@").unwrap();
    assert_refused_unchanged(&mut doc, fams);
}

#[test]
fn test_same_person_cannot_fill_both_roles() {
    let mut doc = new_document();
    create_individual(&mut doc, "I1", "M");
    let fam = create_family(&mut doc, "F1");
    let husb = doc.add_child(fam, "HUSB", "@I1@").unwrap();
    doc.link(husb).unwrap();
    assert_integrity(&doc);

    let same_person = doc.add_child(fam, "WIFE", "@I1@").unwrap();
    assert_refused_unchanged(&mut doc, same_person);
}
