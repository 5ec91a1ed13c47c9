#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use common::*;
use gedgraph_core::{ChangeSet, Document, EntityType, FixedClock, GedcomError, NodeId, TagPath};

#[test]
fn test_change_set_holds_exactly_the_mutated_objects() {
    // GIVEN an individual created outside any transaction
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "M");
    let sex = doc.node(indi).unwrap().children()[0];

    // WHEN a transaction adds, modifies and creates
    doc.start_transaction().unwrap();
    let name = doc.add_child(indi, "NAME", "John /Doe/").unwrap();
    doc.set_value(sex, "F").unwrap();
    let fam = doc.create_entity(EntityType::Family, None).unwrap();
    let changes = doc.commit();

    // THEN each set holds exactly those objects
    assert_eq!(changes.entities_added(), &BTreeSet::from([fam]));
    assert_eq!(changes.properties_added(), &BTreeSet::from([name]));
    assert_eq!(changes.properties_modified(), &BTreeSet::from([sex]));
    assert!(changes.entities_deleted().is_empty());
    assert!(changes.properties_deleted().is_empty());
    assert!(!doc.is_transaction_open());
    assert!(doc.has_unsaved_changes());
}

#[test]
fn test_added_then_removed_in_one_transaction_is_invisible() {
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "");

    doc.start_transaction().unwrap();
    let note = doc.add_child(indi, "RESI", "").unwrap();
    doc.remove_child(indi, note).unwrap();
    let changes = doc.commit();

    assert!(changes.is_empty());
    assert!(!doc.has_unsaved_changes());
}

#[test]
fn test_mutations_outside_transactions_are_never_published() {
    // GIVEN a listener recording every change set
    let mut doc = new_document();
    let seen: Arc<Mutex<Vec<ChangeSet>>> = Arc::default();
    let sink = seen.clone();
    doc.add_listener(move |_: &Document, changes: &ChangeSet| {
        sink.lock().unwrap().push(changes.clone());
    });

    // WHEN one entity is created outside a transaction and one inside
    let outside = doc.create_entity(EntityType::Note, None).unwrap();
    let (inside, _) = doc.edit(|doc| doc.create_entity(EntityType::Note, None)).unwrap();

    // THEN only the transactional one was published
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].entities_added().contains(&inside));
    assert!(!seen[0].entities_added().contains(&outside));
}

#[test]
fn test_listeners_run_in_reverse_order_and_survive_panics() {
    let mut doc = new_document();
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::default();

    let first = order.clone();
    doc.add_listener(move |_: &Document, _: &ChangeSet| first.lock().unwrap().push("first"));
    doc.add_listener(|_: &Document, _: &ChangeSet| panic!("listener bug"));
    let last = order.clone();
    doc.add_listener(move |_: &Document, _: &ChangeSet| last.lock().unwrap().push("last"));

    doc.edit(|doc| doc.create_entity(EntityType::Source, None)).unwrap();

    assert_eq!(*order.lock().unwrap(), vec!["last", "first"]);
    assert!(!doc.is_transaction_open());
}

#[test]
fn test_transaction_misuse() {
    let mut doc = new_document();
    doc.start_transaction().unwrap();
    assert_eq!(doc.start_transaction(), Err(GedcomError::TransactionAlreadyOpen));
    assert_eq!(doc.undo(), Err(GedcomError::TransactionAlreadyOpen));
    doc.commit();
    assert!(matches!(doc.try_commit(), Err(GedcomError::TransactionMisuse { .. })));
}

#[test]
#[should_panic(expected = "Transaction misuse")]
fn test_commit_without_transaction_panics() {
    let mut doc = new_document();
    doc.commit();
}

#[test]
fn test_failed_edit_rolls_back_everything() {
    // GIVEN a linked couple
    let mut doc = new_document();
    let husband = create_individual(&mut doc, "I1", "M");
    create_family(&mut doc, "F1");
    link_spouse(&mut doc, husband, "F1");
    let before = digest(&doc);

    // WHEN an edit mutates and then fails
    let result = doc.edit(|doc| {
        let indi = doc.create_entity(EntityType::Individual, Some("I2"))?;
        doc.add_child(indi, "SEX", "M")?;
        let fams = doc.add_child(indi, "FAMS", "@F1@")?;
        doc.link(fams)
    });

    // THEN the error is returned and the document is unchanged
    assert!(matches!(result, Err(GedcomError::StructuralConsistency { .. })));
    assert_eq!(digest(&doc), before);
    assert!(!doc.is_transaction_open());
    assert_integrity(&doc);
}

#[test]
fn test_undo_restores_structural_digest() {
    // GIVEN a family with two linked children
    let mut doc = new_document();
    let fam = create_family(&mut doc, "F1");
    let first = create_individual(&mut doc, "I1", "M");
    let second = create_individual(&mut doc, "I2", "F");
    link_child(&mut doc, first, "F1");
    link_child(&mut doc, second, "F1");
    let before = digest(&doc);

    // WHEN the family is deleted in a transaction and then undone
    doc.edit(|doc| doc.delete_entity(fam)).unwrap();
    assert_ne!(digest(&doc), before);
    let undone = doc.undo().unwrap();

    // THEN the document is structurally identical again
    assert!(undone.is_undo());
    assert_eq!(digest(&doc), before);
    assert_eq!(doc.children(fam).unwrap(), vec![first, second]);
    assert_integrity(&doc);
    assert_eq!(doc.undo(), Err(GedcomError::NothingToUndo));
}

#[test]
fn test_undo_reverts_rename_and_links() {
    let mut doc = new_document();
    let indi = create_individual(&mut doc, "I1", "M");
    create_family(&mut doc, "F1");
    let before = digest(&doc);

    doc.edit(|doc| {
        let fams = doc.add_child(indi, "FAMS", "@F1@")?;
        doc.link(fams)?;
        doc.rename_entity(indi, "I99")
    })
    .unwrap();
    assert!(doc.can_undo());

    doc.undo().unwrap();
    assert_eq!(digest(&doc), before);
    assert_eq!(doc.entity(EntityType::Individual, "I1").unwrap(), Some(indi));
    assert!(!doc.can_undo());
}

#[test]
fn test_direct_mutation_clears_undo_history() {
    let mut doc = new_document();
    doc.edit(|doc| doc.create_entity(EntityType::Note, None)).unwrap();
    assert!(doc.can_undo());

    doc.create_entity(EntityType::Note, None).unwrap();

    assert!(!doc.can_undo());
}

fn chan_value(doc: &Document, entity: NodeId, path: &str) -> Option<String> {
    let path: TagPath = path.parse().unwrap();
    doc.property(entity, &path, false)
        .unwrap()
        .map(|node| doc.node(node).unwrap().value())
}

#[test]
fn test_commit_stamps_touched_entities() {
    // GIVEN a document with a fixed change clock
    let at = Utc.with_ymd_and_hms(2001, 2, 3, 12, 34, 56).unwrap();
    let mut doc = new_document().with_stamp_policy(FixedClock::new(at));
    let untouched = doc.create_entity(EntityType::Note, Some("N1")).unwrap();
    let indi = doc.create_entity(EntityType::Individual, Some("I1")).unwrap();

    // WHEN a transaction modifies the individual only
    doc.edit(|doc| doc.add_child(indi, "NAME", "Ann /Lee/")).unwrap();

    // THEN the individual carries CHAN:DATE and CHAN:DATE:TIME
    assert_eq!(chan_value(&doc, indi, "INDI:CHAN:DATE").as_deref(), Some("3 FEB 2001"));
    assert_eq!(
        chan_value(&doc, indi, "INDI:CHAN:DATE:TIME").as_deref(),
        Some("12:34:56")
    );
    assert_eq!(chan_value(&doc, untouched, "NOTE:CHAN"), None);

    // AND a second commit updates the stamp in place
    doc.edit(|doc| doc.add_child(indi, "OCCU", "Smith")).unwrap();
    let chan_count = doc
        .node(indi)
        .unwrap()
        .children()
        .iter()
        .filter(|c| doc.node(**c).unwrap().tag() == "CHAN")
        .count();
    assert_eq!(chan_count, 1);
}

#[test]
fn test_mark_saved() {
    let mut doc = new_document();
    doc.edit(|doc| doc.create_entity(EntityType::Repository, None)).unwrap();
    assert!(doc.has_unsaved_changes());
    doc.mark_saved();
    assert!(!doc.has_unsaved_changes());
}
