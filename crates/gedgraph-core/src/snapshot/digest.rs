//! Digest computation for document snapshots
//!
//! ## Determinism Guarantees
//!
//! - Same structure, same digest (canonical JSON serialization)
//! - Arena ids never enter the digest
//! - Entity and child order matter

use sha2::{Digest, Sha256};

use crate::document::Document;
use crate::errors::Result;
use crate::snapshot::model::DocumentSnapshot;

/// Hex-encoded SHA-256 of a snapshot
///
/// # Errors
///
/// Returns `Serialization` if JSON serialization fails.
pub fn compute_digest(snapshot: &DocumentSnapshot) -> Result<String> {
    let canonical = serde_json::to_string(snapshot)?;
    Ok(hash_string(&canonical))
}

/// Capture `doc` and digest it
///
/// ```
/// use gedgraph_core::document::Document;
/// use gedgraph_core::snapshot::document_digest;
///
/// let digest = document_digest(&Document::new()).unwrap();
/// assert_eq!(digest.len(), 64);
/// ```
///
/// # Errors
///
/// Returns `NodeNotFound` or `Serialization` if capture fails.
pub fn document_digest(doc: &Document) -> Result<String> {
    compute_digest(&DocumentSnapshot::capture(doc)?)
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
