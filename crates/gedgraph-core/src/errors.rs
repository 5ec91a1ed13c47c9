use thiserror::Error;

use crate::graph::NodeId;
use crate::time::CalendarKind;

/// Result type alias using GedcomError
pub type Result<T> = std::result::Result<T, GedcomError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every kind maps to a stable error code that can be used for programmatic
/// handling, log assertions and external API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Identity
    InvalidInput,
    NotFound,
    DuplicateId,
    AmbiguousId,

    // Linking
    TargetNotFound,
    StructuralConsistency,
    ReferenceLinked,

    // Calendar
    InvalidDate,
    UnsupportedRange,

    // Grammar
    SchemaTypeMismatch,
    GrammarSource,

    // Transactions
    TransactionMisuse,
    TransactionAlreadyOpen,
    NothingToUndo,

    // Integration
    Serialization,
    Concurrency,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::DuplicateId => "ERR_DUPLICATE_ID",
            ExErrorKind::AmbiguousId => "ERR_AMBIGUOUS_ID",
            ExErrorKind::TargetNotFound => "ERR_TARGET_NOT_FOUND",
            ExErrorKind::StructuralConsistency => "ERR_STRUCTURAL_CONSISTENCY",
            ExErrorKind::ReferenceLinked => "ERR_REFERENCE_LINKED",
            ExErrorKind::InvalidDate => "ERR_INVALID_DATE",
            ExErrorKind::UnsupportedRange => "ERR_UNSUPPORTED_RANGE",
            ExErrorKind::SchemaTypeMismatch => "ERR_SCHEMA_TYPE_MISMATCH",
            ExErrorKind::GrammarSource => "ERR_GRAMMAR_SOURCE",
            ExErrorKind::TransactionMisuse => "ERR_TRANSACTION_MISUSE",
            ExErrorKind::TransactionAlreadyOpen => "ERR_TRANSACTION_ALREADY_OPEN",
            ExErrorKind::NothingToUndo => "ERR_NOTHING_TO_UNDO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification used by the logging macros plus optional
/// context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    tag: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            tag: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add property tag context
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the tag context, if any
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(tag) = &self.tag {
            write!(f, " (tag: {})", tag)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for document, grammar and calendar operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GedcomError {
    // ===== Identity =====
    /// Creating or renaming an entity to an id already in use
    #[error("Duplicate id {id}")]
    DuplicateId { id: String },

    /// Lookup of an id currently shared by more than one entity
    #[error("Id {id} is shared by {count} entities")]
    AmbiguousId { id: String, count: usize },

    /// Empty, blank or unchanged entity id
    #[error("Invalid entity id '{id}': {reason}")]
    InvalidId { id: String, reason: String },

    /// Entity is not indexed in this document
    #[error("Entity not found: {id}")]
    EntityNotFound { id: String },

    /// Node does not exist or is no longer part of the document
    #[error("Node not found: {node}")]
    NodeNotFound { node: NodeId },

    // ===== Linking =====
    /// Cross-reference points at no entity
    #[error("Cross-reference target not found: {id}")]
    TargetNotFound { id: String },

    /// Linking would break the family structure
    #[error("Structural consistency violation: {reason}")]
    StructuralConsistency { reason: String },

    /// Value of a resolved cross-reference cannot be rewritten
    #[error("Cross-reference {tag} is linked; unlink it before changing its value")]
    ReferenceLinked { tag: String },

    // ===== Calendar =====
    /// Day/month/year outside the calendar's valid range
    #[error("Invalid date: {reason}")]
    InvalidDate { reason: String },

    /// Julian day outside the interval a calendar supports
    #[error("Julian day {jdn} is outside the supported range of the {calendar} calendar")]
    UnsupportedRange { calendar: CalendarKind, jdn: i64 },

    /// Age value that is not of the form `10y 2m 3d`
    #[error("Invalid age value: {text}")]
    InvalidAge { text: String },

    // ===== Grammar =====
    /// Declared property type cannot be constructed for this value
    #[error("Property type {type_name} cannot be constructed for {tag}: {reason}")]
    SchemaTypeMismatch {
        tag: String,
        type_name: String,
        reason: String,
    },

    /// Malformed tag path
    #[error("Invalid tag path: '{path}'")]
    InvalidTagPath { path: String },

    /// Grammar declarations could not be read
    #[error("Grammar source error: {message}")]
    GrammarSource { message: String },

    // ===== Transactions =====
    /// Commit without an open transaction
    #[error("Transaction misuse: {message}")]
    TransactionMisuse { message: String },

    /// A transaction is already open on this document
    #[error("A transaction is already open")]
    TransactionAlreadyOpen,

    /// Undo requested with an empty history
    #[error("Nothing to undo")]
    NothingToUndo,

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A shared document lock was poisoned by a panicking writer
    #[error("Concurrency error: {message}")]
    Concurrency { message: String },
}

/// Conversion from GedcomError to ExError
impl From<GedcomError> for ExError {
    fn from(err: GedcomError) -> Self {
        let message = err.to_string();
        match err {
            GedcomError::DuplicateId { id } => ExError::new(ExErrorKind::DuplicateId)
                .with_entity_id(id)
                .with_message(message),

            GedcomError::AmbiguousId { id, .. } => ExError::new(ExErrorKind::AmbiguousId)
                .with_entity_id(id)
                .with_message(message),

            GedcomError::InvalidId { id, .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(id)
                .with_message(message),

            GedcomError::EntityNotFound { id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(id)
                .with_message(message),

            GedcomError::NodeNotFound { .. } => {
                ExError::new(ExErrorKind::NotFound).with_message(message)
            }

            GedcomError::TargetNotFound { id } => ExError::new(ExErrorKind::TargetNotFound)
                .with_entity_id(id)
                .with_message(message),

            GedcomError::StructuralConsistency { .. } => {
                ExError::new(ExErrorKind::StructuralConsistency).with_message(message)
            }

            GedcomError::ReferenceLinked { tag } => ExError::new(ExErrorKind::ReferenceLinked)
                .with_tag(tag)
                .with_message(message),

            GedcomError::InvalidDate { .. } => {
                ExError::new(ExErrorKind::InvalidDate).with_message(message)
            }

            GedcomError::UnsupportedRange { .. } => {
                ExError::new(ExErrorKind::UnsupportedRange).with_message(message)
            }

            GedcomError::InvalidAge { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            GedcomError::SchemaTypeMismatch { tag, .. } => {
                ExError::new(ExErrorKind::SchemaTypeMismatch)
                    .with_tag(tag)
                    .with_message(message)
            }

            GedcomError::InvalidTagPath { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            GedcomError::GrammarSource { .. } => {
                ExError::new(ExErrorKind::GrammarSource).with_message(message)
            }

            GedcomError::TransactionMisuse { .. } => {
                ExError::new(ExErrorKind::TransactionMisuse).with_message(message)
            }

            GedcomError::TransactionAlreadyOpen => {
                ExError::new(ExErrorKind::TransactionAlreadyOpen).with_message(message)
            }

            GedcomError::NothingToUndo => {
                ExError::new(ExErrorKind::NothingToUndo).with_message(message)
            }

            GedcomError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            GedcomError::Concurrency { .. } => {
                ExError::new(ExErrorKind::Concurrency).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to GedcomError
impl From<serde_json::Error> for GedcomError {
    fn from(err: serde_json::Error) -> Self {
        GedcomError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from serde_yaml::Error to GedcomError
impl From<serde_yaml::Error> for GedcomError {
    fn from(err: serde_yaml::Error) -> Self {
        GedcomError::GrammarSource {
            message: format!("YAML parse error: {}", err),
        }
    }
}
