use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{GedcomError, Result};
use crate::graph::{CrossRef, DateValue, EntityType, NameValue, Payload, SexValue, XRefKind};

/// Closed set of property kinds a grammar can declare
///
/// Each kind knows how to build the payload for a value; the mapping from
/// declared type names is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Scalar,
    Composite,
    Date,
    Name,
    Sex,
    FamilyChild,
    FamilySpouse,
    Husband,
    Wife,
    Child,
    /// Generic reference; the target type comes from the declaration
    Reference,
}

impl PropertyKind {
    /// Kind for a declared type name
    pub fn from_type_name(name: &str) -> Option<PropertyKind> {
        let kind = match name {
            "SimpleValue" | "MultiLineValue" | "Choice" | "Age" | "Place" | "Time" => {
                PropertyKind::Scalar
            }
            "Event" | "Composite" | "Association" => PropertyKind::Composite,
            "Date" => PropertyKind::Date,
            "Name" => PropertyKind::Name,
            "Sex" => PropertyKind::Sex,
            "FamilyChild" => PropertyKind::FamilyChild,
            "FamilySpouse" => PropertyKind::FamilySpouse,
            "Husband" => PropertyKind::Husband,
            "Wife" => PropertyKind::Wife,
            "Child" => PropertyKind::Child,
            "XRef" => PropertyKind::Reference,
            _ => return None,
        };
        Some(kind)
    }

    pub fn type_name(self) -> &'static str {
        match self {
            PropertyKind::Scalar => "SimpleValue",
            PropertyKind::Composite => "Composite",
            PropertyKind::Date => "Date",
            PropertyKind::Name => "Name",
            PropertyKind::Sex => "Sex",
            PropertyKind::FamilyChild => "FamilyChild",
            PropertyKind::FamilySpouse => "FamilySpouse",
            PropertyKind::Husband => "Husband",
            PropertyKind::Wife => "Wife",
            PropertyKind::Child => "Child",
            PropertyKind::Reference => "XRef",
        }
    }

    pub fn is_cross_ref(self) -> bool {
        self.xref_kind(Some(EntityType::Note)).is_some()
    }

    fn xref_kind(self, target: Option<EntityType>) -> Option<XRefKind> {
        match self {
            PropertyKind::FamilyChild => Some(XRefKind::FamilyChild),
            PropertyKind::FamilySpouse => Some(XRefKind::FamilySpouse),
            PropertyKind::Husband => Some(XRefKind::Husband),
            PropertyKind::Wife => Some(XRefKind::Wife),
            PropertyKind::Child => Some(XRefKind::Child),
            PropertyKind::Reference => target.map(XRefKind::Reference),
            _ => None,
        }
    }

    /// Build the payload for `value`
    ///
    /// Reference kinds only build a cross-reference for pointer text
    /// (`@N1@`) or an empty value; other text becomes a scalar.
    ///
    /// # Errors
    ///
    /// Returns `SchemaTypeMismatch` for a generic reference declared without
    /// a target type.
    pub fn construct(self, tag: &str, value: &str, xref_target: Option<EntityType>) -> Result<Payload> {
        let payload = match self {
            PropertyKind::Scalar => Payload::Scalar(value.to_string()),
            PropertyKind::Composite => Payload::Composite(value.to_string()),
            PropertyKind::Date => Payload::Date(DateValue::parse(value)),
            PropertyKind::Name => Payload::Name(NameValue::parse(value)),
            PropertyKind::Sex => Payload::Sex(SexValue::parse(value)),
            // inline text under a reference tag is kept as written
            _ if !CrossRef::is_pointer_text(value) => Payload::Scalar(value.to_string()),
            _ => {
                let kind = self.xref_kind(xref_target).ok_or_else(|| {
                    GedcomError::SchemaTypeMismatch {
                        tag: tag.to_string(),
                        type_name: self.type_name().to_string(),
                        reason: "reference declared without a target type".to_string(),
                    }
                })?;
                Payload::CrossRef(CrossRef::new(kind, value))
            }
        };
        Ok(payload)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_map_to_kinds() {
        assert_eq!(PropertyKind::from_type_name("Event"), Some(PropertyKind::Composite));
        assert_eq!(PropertyKind::from_type_name("MultiLineValue"), Some(PropertyKind::Scalar));
        assert_eq!(PropertyKind::from_type_name("Bogus"), None);
    }

    #[test]
    fn test_construct_family_link() {
        let payload = PropertyKind::FamilySpouse.construct("FAMS", "@F1@", None).unwrap();
        let xref = payload.as_cross_ref().unwrap();
        assert_eq!(xref.kind(), XRefKind::FamilySpouse);
        assert_eq!(xref.target_id(), "F1");
    }

    #[test]
    fn test_reference_without_target_is_mismatch() {
        let err = PropertyKind::Reference.construct("NOTE", "@N1@", None).unwrap_err();
        assert!(matches!(err, GedcomError::SchemaTypeMismatch { .. }));
    }

    #[test]
    fn test_reference_with_target() {
        let payload = PropertyKind::Reference
            .construct("SOUR", "@S1@", Some(EntityType::Source))
            .unwrap();
        assert_eq!(
            payload.as_cross_ref().map(CrossRef::kind),
            Some(XRefKind::Reference(EntityType::Source))
        );
    }

    #[test]
    fn test_inline_text_under_reference_is_scalar() {
        let note = PropertyKind::Reference
            .construct("NOTE", "Born in Paris", Some(EntityType::Note))
            .unwrap();
        assert_eq!(note, Payload::Scalar("Born in Paris".to_string()));

        let empty = PropertyKind::Reference.construct("NOTE", "", Some(EntityType::Note)).unwrap();
        assert!(empty.as_cross_ref().is_some());
    }

    #[test]
    fn test_date_keeps_unparsed_text() {
        let payload = PropertyKind::Date.construct("DATE", "someday", None).unwrap();
        assert_eq!(payload.as_text(), "someday");
        assert!(!payload.is_valid());
    }
}
