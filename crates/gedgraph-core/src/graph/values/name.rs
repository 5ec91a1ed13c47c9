use serde::{Deserialize, Serialize};

/// Value of a personal name in `First /Last/ Suffix` form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameValue {
    raw: String,
    parts: Option<NameParts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct NameParts {
    given: String,
    surname: String,
    suffix: String,
}

impl NameValue {
    /// Parse name text; more than two slashes leave the value unparsed
    pub fn parse(text: &str) -> NameValue {
        let raw = text.trim().to_string();
        let pieces: Vec<&str> = raw.split('/').collect();
        let parts = match pieces.as_slice() {
            [given] => Some(NameParts {
                given: given.trim().to_string(),
                surname: String::new(),
                suffix: String::new(),
            }),
            // a missing closing slash runs the surname to the end
            [given, surname] => Some(NameParts {
                given: given.trim().to_string(),
                surname: surname.trim().to_string(),
                suffix: String::new(),
            }),
            [given, surname, suffix] => Some(NameParts {
                given: given.trim().to_string(),
                surname: surname.trim().to_string(),
                suffix: suffix.trim().to_string(),
            }),
            _ => None,
        };
        NameValue { raw, parts }
    }

    pub fn is_valid(&self) -> bool {
        self.parts.is_some()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn given(&self) -> Option<&str> {
        self.parts.as_ref().map(|p| p.given.as_str())
    }

    pub fn surname(&self) -> Option<&str> {
        self.parts.as_ref().map(|p| p.surname.as_str())
    }

    pub fn suffix(&self) -> Option<&str> {
        self.parts.as_ref().map(|p| p.suffix.as_str())
    }
}
