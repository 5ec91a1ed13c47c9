//! Canonical document snapshots
//!
//! A snapshot is a serde model of a document with arena ids replaced by
//! positions, so two documents with the same structure produce the same
//! snapshot however their nodes were allocated. Its SHA-256 digest is used
//! to compare document states before and after an operation.

pub mod digest;
pub mod model;

pub use digest::{compute_digest, document_digest};
pub use model::{DocumentSnapshot, EntitySnapshot, LinkTarget, NodeSnapshot};
