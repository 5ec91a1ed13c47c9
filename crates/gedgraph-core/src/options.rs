//! Document configuration

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Tunables of a `Document`
///
/// Every field has a default, so a JSON object only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Minimum length of generated entity ids, prefix included (`I001` for 4)
    pub min_id_width: usize,
    /// Whether unknown tags are memoized in the shared grammar
    pub remember_unknown_tags: bool,
    /// Whether committed transactions can be undone
    pub keep_undo_history: bool,
    /// Maximum number of transactions kept for undo
    pub undo_depth: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            min_id_width: 4,
            remember_unknown_tags: true,
            keep_undo_history: true,
            undo_depth: 64,
        }
    }
}

impl DocumentOptions {
    /// Load options from a JSON object
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON or mistyped fields.
    pub fn from_json_str(content: &str) -> Result<DocumentOptions> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GedcomError;

    #[test]
    fn test_defaults() {
        let options = DocumentOptions::default();
        assert_eq!(options.min_id_width, 4);
        assert!(options.remember_unknown_tags);
        assert!(options.keep_undo_history);
        assert_eq!(options.undo_depth, 64);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = DocumentOptions::from_json_str(r#"{"min_id_width": 3, "undo_depth": 5}"#).unwrap();
        assert_eq!(options.min_id_width, 3);
        assert_eq!(options.undo_depth, 5);
        assert!(options.keep_undo_history);
    }

    #[test]
    fn test_mistyped_json_is_serialization_error() {
        let err = DocumentOptions::from_json_str(r#"{"min_id_width": "wide"}"#).unwrap_err();
        assert!(matches!(err, GedcomError::Serialization { .. }));
    }
}
