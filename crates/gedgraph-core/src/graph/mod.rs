//! Property graph primitives
//!
//! Nodes live in an arena owned by the `Document` and refer to each other by
//! `NodeId`. A node's payload is a closed tagged union; entities are nodes
//! carrying an `EntityMeta`.

pub(crate) mod arena;
pub mod node;
pub mod payload;
pub mod tag_path;
pub mod values;

pub use node::{EntityMeta, EntityType, Node, NodeId};
pub use payload::{CrossRef, Payload, XRefKind};
pub use tag_path::TagPath;
pub use values::{DateFormat, DateValue, NameValue, SexValue};
