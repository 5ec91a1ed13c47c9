use serde::{Deserialize, Serialize};

/// Value of a `SEX` property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SexValue {
    Male,
    Female,
    Unknown,
    /// Text that is not a recognised sex code, kept as written
    Unparsed(String),
}

impl SexValue {
    /// `M`, `F` and `U` (any case) or empty; anything else is kept verbatim
    pub fn parse(text: &str) -> SexValue {
        let trimmed = text.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "M" => SexValue::Male,
            "F" => SexValue::Female,
            "" | "U" => SexValue::Unknown,
            _ => SexValue::Unparsed(trimmed.to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, SexValue::Unparsed(_))
    }

    /// GEDCOM text
    pub fn as_text(&self) -> &str {
        match self {
            SexValue::Male => "M",
            SexValue::Female => "F",
            SexValue::Unknown => "",
            SexValue::Unparsed(text) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_case_insensitive() {
        assert_eq!(SexValue::parse("m"), SexValue::Male);
        assert_eq!(SexValue::parse(" F "), SexValue::Female);
        assert_eq!(SexValue::parse(""), SexValue::Unknown);
    }

    #[test]
    fn test_unknown_text_is_kept_and_invalid() {
        let value = SexValue::parse("Male");
        assert!(!value.is_valid());
        assert_eq!(value.as_text(), "Male");
    }
}
