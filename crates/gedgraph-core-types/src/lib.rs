//! Value types shared by `gedgraph-core` and its consumers
//!
//! - `ChangeSetId`: identity of a committed transaction
//! - `schema`: log field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::ChangeSetId;
