//! gedgraph core - in-memory genealogical document kernel
//!
//! This crate provides the data structures and operations of a genealogy
//! document:
//! - Calendar engine for Gregorian, Julian, Hebrew and French Republican
//!   dates, with Julian Day conversion and age arithmetic
//! - Declarative tag grammar with inheritance and memoized unknown tags
//! - Arena-backed property graph with typed payloads and tag-path queries
//! - Entity index, cross-reference linker and family rules
//! - Transactions producing change sets for listeners, with undo
//! - Integrity checkers and structural snapshot digests

pub mod document;
pub mod errors;
pub mod grammar;
pub mod graph;
pub mod logging_facility;
pub mod options;
pub mod policy;
pub mod rules;
pub mod snapshot;
pub mod time;

// Re-export commonly used types
pub use document::{ChangeSet, Direction, Document, DocumentListener, ListenerId, SharedDocument};
pub use errors::{ExError, ExErrorKind, GedcomError, Result};
pub use grammar::{Grammar, MetaNode, PropertyKind};
pub use graph::{CrossRef, EntityType, Node, NodeId, Payload, TagPath, XRefKind};
pub use options::DocumentOptions;
pub use policy::{ChangeStampPolicy, FixedClock, NeverStamp, SystemClock};
pub use time::{CalendarKind, Delta, PointInTime};
