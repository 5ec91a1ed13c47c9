//! Grammar registry
//!
//! Describes which properties may appear where, what kind of value each
//! one holds and which children a new property gets by default.

pub mod kind;
pub mod meta;
pub mod registry;
pub mod source;

pub use kind::PropertyKind;
pub use meta::MetaNode;
pub use registry::Grammar;
pub use source::{parse_grammar_str, GrammarBuilder, GrammarSourceV1, TagAttrs, TagDecl};
