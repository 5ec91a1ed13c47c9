use serde::{Deserialize, Serialize};

use crate::time::PointInTime;

/// Shape of a GEDCOM date value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    /// `DATE`
    Date,
    /// `FROM DATE TO DATE`
    FromTo,
    /// `FROM DATE`
    From,
    /// `TO DATE`
    To,
    /// `BET DATE AND DATE`
    Between,
    /// `BEF DATE`
    Before,
    /// `AFT DATE`
    After,
    /// `ABT DATE`
    About,
    /// `CAL DATE`
    Calculated,
    /// `EST DATE`
    Estimated,
    /// `INT DATE (phrase)`
    Interpreted,
    /// `(phrase)`
    Phrase,
}

impl DateFormat {
    /// Formats bounded by two points
    pub fn is_range(self) -> bool {
        matches!(self, DateFormat::FromTo | DateFormat::Between)
    }

    fn single_point_keyword(keyword: &str) -> Option<DateFormat> {
        match keyword {
            "FROM" => Some(DateFormat::From),
            "TO" => Some(DateFormat::To),
            "BEF" => Some(DateFormat::Before),
            "AFT" => Some(DateFormat::After),
            "ABT" => Some(DateFormat::About),
            "CAL" => Some(DateFormat::Calculated),
            "EST" => Some(DateFormat::Estimated),
            _ => None,
        }
    }
}

/// Value of a `DATE` property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateValue {
    raw: String,
    parsed: Option<ParsedDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct ParsedDate {
    format: DateFormat,
    start: Option<PointInTime>,
    end: Option<PointInTime>,
    phrase: Option<String>,
}

impl DateValue {
    /// Parse date text; unparseable text is kept and marks the value invalid
    pub fn parse(text: &str) -> DateValue {
        let raw = text.trim().to_string();
        let parsed = parse_date(&raw);
        DateValue { raw, parsed }
    }

    /// A plain date for a single point
    pub fn from_point(pit: &PointInTime) -> DateValue {
        DateValue::parse(&pit.to_string())
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn format(&self) -> Option<DateFormat> {
        self.parsed.as_ref().map(|p| p.format)
    }

    /// First (or only) point of the value
    pub fn start(&self) -> Option<&PointInTime> {
        self.parsed.as_ref().and_then(|p| p.start.as_ref())
    }

    /// Second point of a range
    pub fn end(&self) -> Option<&PointInTime> {
        self.parsed.as_ref().and_then(|p| p.end.as_ref())
    }

    /// Free text of `INT` and phrase-only values
    pub fn phrase(&self) -> Option<&str> {
        self.parsed.as_ref().and_then(|p| p.phrase.as_deref())
    }
}

fn point(text: &str) -> Option<PointInTime> {
    PointInTime::parse(text).ok()
}

/// Split whitespace tokens around the first standalone `keyword`
fn split_at_keyword(tokens: &[&str], keyword: &str) -> Option<(String, String)> {
    let index = tokens
        .iter()
        .position(|token| token.eq_ignore_ascii_case(keyword))?;
    Some((tokens[..index].join(" "), tokens[index + 1..].join(" ")))
}

fn parse_date(text: &str) -> Option<ParsedDate> {
    let simple = |format, start| ParsedDate {
        format,
        start: Some(start),
        end: None,
        phrase: None,
    };

    if text.starts_with('(') && text.ends_with(')') && text.len() >= 2 {
        return Some(ParsedDate {
            format: DateFormat::Phrase,
            start: None,
            end: None,
            phrase: Some(text[1..text.len() - 1].trim().to_string()),
        });
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (keyword, rest) = tokens.split_first()?;
    let keyword = keyword.to_ascii_uppercase();

    match keyword.as_str() {
        "FROM" => match split_at_keyword(rest, "TO") {
            Some((from, to)) => Some(ParsedDate {
                format: DateFormat::FromTo,
                start: Some(point(&from)?),
                end: Some(point(&to)?),
                phrase: None,
            }),
            None => Some(simple(DateFormat::From, point(&rest.join(" "))?)),
        },
        "BET" => {
            let (from, to) = split_at_keyword(rest, "AND")?;
            Some(ParsedDate {
                format: DateFormat::Between,
                start: Some(point(&from)?),
                end: Some(point(&to)?),
                phrase: None,
            })
        }
        "INT" => {
            let rest = rest.join(" ");
            let open = rest.find('(')?;
            let inner = rest[open..].strip_prefix('(')?.strip_suffix(')')?;
            Some(ParsedDate {
                format: DateFormat::Interpreted,
                start: Some(point(&rest[..open])?),
                end: None,
                phrase: Some(inner.trim().to_string()),
            })
        }
        other => match DateFormat::single_point_keyword(other) {
            Some(format) => Some(simple(format, point(&rest.join(" "))?)),
            None => Some(simple(DateFormat::Date, point(text)?)),
        },
    }
}
