#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::{BTreeMap, BTreeSet};

use common::*;
use gedgraph_core::{Document, EntityType, GedcomError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create(Option<u8>),
    Import(u8),
    Delete(usize),
    Rename(usize, u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        proptest::option::of(0u8..6).prop_map(Op::Create),
        (0u8..6).prop_map(Op::Import),
        (0usize..16).prop_map(Op::Delete),
        (0usize..16, 0u8..6).prop_map(|(at, id)| Op::Rename(at, id)),
    ]
}

fn id(n: u8) -> String {
    format!("S{n}")
}

/// Ids held by two or more sources, computed from the entities themselves
fn shared_ids(doc: &Document) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entity in doc.entities(EntityType::Source) {
        *counts.entry(doc.entity_meta(*entity).unwrap().id.clone()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect()
}

proptest! {
    #[test]
    fn test_index_tracks_exactly_the_shared_ids(ops in proptest::collection::vec(op(), 1..40)) {
        let mut doc = new_document();
        for op in ops {
            let sources = doc.entities(EntityType::Source).to_vec();
            match op {
                Op::Create(n) => {
                    let wanted = n.map(id);
                    let taken = wanted.as_ref().is_some_and(|w| {
                        sources.iter().any(|s| &doc.entity_meta(*s).unwrap().id == w)
                    });
                    let result = doc.create_entity(EntityType::Source, wanted.as_deref());
                    prop_assert_eq!(result.is_err(), taken);
                }
                Op::Import(n) => {
                    doc.import_entity(EntityType::Source, &id(n)).unwrap();
                }
                Op::Delete(at) => {
                    if let Some(entity) = sources.get(at % sources.len().max(1)) {
                        doc.delete_entity(*entity).unwrap();
                    }
                }
                Op::Rename(at, n) => {
                    if let Some(entity) = sources.get(at % sources.len().max(1)) {
                        match doc.rename_entity(*entity, &id(n)) {
                            Ok(()) | Err(GedcomError::DuplicateId { .. }) | Err(GedcomError::InvalidId { .. }) => {}
                            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
                        }
                    }
                }
            }

            // every id either resolves uniquely or is reported as shared
            let shared = shared_ids(&doc);
            prop_assert_eq!(doc.duplicate_ids(EntityType::Source), shared.clone());
            let ids: BTreeSet<String> = doc
                .entities(EntityType::Source)
                .iter()
                .map(|e| doc.entity_meta(*e).unwrap().id.clone())
                .collect();
            for id in ids {
                let lookup = doc.entity(EntityType::Source, &id);
                if shared.contains(&id) {
                    let is_ambiguous = matches!(lookup, Err(GedcomError::AmbiguousId { .. }));
                    prop_assert!(is_ambiguous);
                } else {
                    prop_assert!(lookup.unwrap().is_some());
                }
            }
            assert_integrity(&doc);
        }
    }
}

#[test]
fn test_generated_ids_never_collide_with_imports() {
    // GIVEN imported ids in both padded and unpadded form
    let mut doc = new_document();
    doc.import_entity(EntityType::Individual, "I1").unwrap();
    doc.import_entity(EntityType::Individual, "I002").unwrap();

    // WHEN ids are generated
    let third = doc.create_entity(EntityType::Individual, None).unwrap();
    let fourth = doc.create_entity(EntityType::Individual, None).unwrap();

    // THEN they skip every taken form
    assert_eq!(doc.entity_meta(third).unwrap().id, "I003");
    assert_eq!(doc.entity_meta(fourth).unwrap().id, "I004");
    assert!(doc.duplicate_ids(EntityType::Individual).is_empty());
}
