//! Structural integrity rules
//!
//! Checkers that report violations of the document's guarantees: index and
//! collection agreement, duplicate tracking, symmetric cross-reference
//! pairs and tree shape. Public operations must never leave a violation
//! behind.

pub mod invariants;
pub mod validation;

pub use invariants::{check_all, IntegrityViolation};
pub use validation::validate_document;
