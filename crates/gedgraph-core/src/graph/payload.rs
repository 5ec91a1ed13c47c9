use serde::{Deserialize, Serialize};

use crate::graph::{DateValue, EntityType, NameValue, NodeId, SexValue};

/// Relationship a cross-reference expresses
///
/// Family links come in fixed pairs (`FamilySpouse` with `Husband` or
/// `Wife`, `FamilyChild` with `Child`); every other reference is backed by
/// a `Foreign` marker on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XRefKind {
    /// `INDI:FAMC`, individual to the family it is a child of
    FamilyChild,
    /// `INDI:FAMS`, individual to a family it is a spouse in
    FamilySpouse,
    /// `FAM:HUSB`
    Husband,
    /// `FAM:WIFE`
    Wife,
    /// `FAM:CHIL`
    Child,
    /// Any other reference to an entity of the given type
    Reference(EntityType),
    /// Backlink marker created on the target of a `Reference`
    Foreign,
}

impl XRefKind {
    /// Entity type the reference resolves against; `None` for markers
    pub fn target_type(self) -> Option<EntityType> {
        match self {
            XRefKind::FamilyChild | XRefKind::FamilySpouse => Some(EntityType::Family),
            XRefKind::Husband | XRefKind::Wife | XRefKind::Child => Some(EntityType::Individual),
            XRefKind::Reference(target) => Some(target),
            XRefKind::Foreign => None,
        }
    }
}

/// A cross-reference, resolved or not
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossRef {
    pub(crate) kind: XRefKind,
    pub(crate) target_id: String,
    pub(crate) target: Option<NodeId>,
}

impl CrossRef {
    /// An unresolved reference; surrounding `@` are stripped from the id
    pub fn new(kind: XRefKind, target_id: &str) -> Self {
        Self {
            kind,
            target_id: target_id.trim().trim_matches('@').to_string(),
            target: None,
        }
    }

    /// Whether `text` is empty or written as a pointer (`@I1@`)
    ///
    /// Anything else under a reference tag is inline text, such as a `NOTE`
    /// written out in full.
    pub fn is_pointer_text(text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return true;
        }
        match text.strip_prefix('@').and_then(|rest| rest.strip_suffix('@')) {
            Some(id) => !id.is_empty() && !id.chars().any(|c| c == '@' || c.is_whitespace()),
            None => false,
        }
    }

    pub fn kind(&self) -> XRefKind {
        self.kind
    }

    /// Id of the referenced entity as written
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Reciprocal node once linked
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    /// Valid when linked, or when there is nothing to link
    pub fn is_valid(&self) -> bool {
        self.target.is_some() || self.target_id.is_empty()
    }

    /// GEDCOM text (`@I001@`)
    pub fn as_text(&self) -> String {
        if self.target_id.is_empty() {
            String::new()
        } else {
            format!("@{}@", self.target_id)
        }
    }
}

/// Kind-specific content of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payload {
    /// Plain text value
    Scalar(String),
    CrossRef(CrossRef),
    Date(DateValue),
    Name(NameValue),
    Sex(SexValue),
    /// Container such as an event; the text is usually empty or `Y`
    Composite(String),
}

impl Payload {
    /// Value as GEDCOM text
    pub fn as_text(&self) -> String {
        match self {
            Payload::Scalar(text) | Payload::Composite(text) => text.clone(),
            Payload::CrossRef(xref) => xref.as_text(),
            Payload::Date(date) => date.raw().to_string(),
            Payload::Name(name) => name.raw().to_string(),
            Payload::Sex(sex) => sex.as_text().to_string(),
        }
    }

    /// Whether the typed parser accepted the text
    pub fn is_valid(&self) -> bool {
        match self {
            Payload::Scalar(_) | Payload::Composite(_) => true,
            Payload::CrossRef(xref) => xref.is_valid(),
            Payload::Date(date) => date.is_valid(),
            Payload::Name(name) => name.is_valid(),
            Payload::Sex(sex) => sex.is_valid(),
        }
    }

    pub fn as_cross_ref(&self) -> Option<&CrossRef> {
        match self {
            Payload::CrossRef(xref) => Some(xref),
            _ => None,
        }
    }

    pub(crate) fn as_cross_ref_mut(&mut self) -> Option<&mut CrossRef> {
        match self {
            Payload::CrossRef(xref) => Some(xref),
            _ => None,
        }
    }

    /// Same kind of payload re-parsed from new text
    pub(crate) fn reparsed(&self, text: &str) -> Payload {
        match self {
            Payload::Scalar(_) => Payload::Scalar(text.to_string()),
            Payload::Composite(_) => Payload::Composite(text.to_string()),
            Payload::CrossRef(xref) => Payload::CrossRef(CrossRef::new(xref.kind, text)),
            Payload::Date(_) => Payload::Date(DateValue::parse(text)),
            Payload::Name(_) => Payload::Name(NameValue::parse(text)),
            Payload::Sex(_) => Payload::Sex(SexValue::parse(text)),
        }
    }
}
