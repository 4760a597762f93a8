//! Key-field extraction from document text using regex patterns.
//!
//! Pure functions, no async. Each configured pattern is compiled once at
//! startup and run against the full extracted text; the first match wins.

use regex::{Regex, RegexBuilder};
use serde::ser::SerializeMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::FieldPattern;

/// Pre-compiled field patterns ready for matching.
pub struct CompiledFields {
    fields: Vec<CompiledField>,
}

struct CompiledField {
    key: String,
    group: usize,
    /// `None` when the configured regex failed to compile.
    regex: Option<Regex>,
}

/// Extracted key fields, in pattern order. Misses serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyInfo {
    entries: Vec<(String, Option<String>)>,
}

impl KeyInfo {
    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Number of fields that matched.
    pub fn found(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Serialize for KeyInfo {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl CompiledFields {
    /// Compile field patterns case-insensitively. Invalid regexes are kept as
    /// permanent misses so their key still appears in the output.
    pub fn compile(patterns: &[FieldPattern]) -> Self {
        let fields: Vec<CompiledField> = patterns
            .iter()
            .map(|p| {
                let regex = match RegexBuilder::new(&p.pattern).case_insensitive(true).build() {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        warn!(
                            "Skipping invalid field pattern '{}' ({}): {}",
                            p.label.as_deref().unwrap_or(&p.key),
                            p.pattern,
                            e
                        );
                        None
                    }
                };
                CompiledField {
                    key: p.key.clone(),
                    group: p.group,
                    regex,
                }
            })
            .collect();

        debug!(
            "Compiled {} of {} field patterns",
            fields.iter().filter(|f| f.regex.is_some()).count(),
            fields.len()
        );
        Self { fields }
    }

    /// Run every pattern against `text`.
    pub fn extract(&self, text: &str) -> KeyInfo {
        let entries = self
            .fields
            .iter()
            .map(|field| {
                let value = field.regex.as_ref().and_then(|regex| {
                    regex
                        .captures(text)
                        .map(|cap| {
                            cap.get(field.group)
                                .map(|m| m.as_str().trim().to_string())
                                .unwrap_or_default()
                        })
                });
                (field.key.clone(), value)
            })
            .collect();

        KeyInfo { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_field_patterns;

    fn compiled() -> CompiledFields {
        CompiledFields::compile(&default_field_patterns())
    }

    #[test]
    fn test_extract_all_fields() {
        let text = "Name: Jane Doe\n\
                    DOB: 04/11/1998\n\
                    University: State Technical University \n\
                    Place - Springfield\n\
                    Date: 12-03-2024 Time: 10:30 AM";
        let info = compiled().extract(text);

        assert_eq!(info.get("Name"), Some("Jane Doe"));
        assert_eq!(info.get("DOB"), Some("04/11/1998"));
        assert_eq!(info.get("Institution"), Some("State Technical University"));
        assert_eq!(info.get("Place"), Some("Springfield"));
        assert_eq!(info.get("DateTime"), Some("Date: 12-03-2024 Time: 10:30"));
        assert_eq!(info.found(), 5);
    }

    #[test]
    fn test_case_insensitive_and_first_match() {
        let text = "date of birth - 01-01-2000\nNAME: first\nname: second";
        let info = compiled().extract(text);

        assert_eq!(info.get("DOB"), Some("01-01-2000"));
        assert_eq!(info.get("Name"), Some("first"));
    }

    #[test]
    fn test_misses_serialize_as_null_in_order() {
        let info = compiled().extract("nothing interesting here");
        assert_eq!(info.found(), 0);

        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(
            json,
            r#"{"Name":null,"DOB":null,"Institution":null,"Place":null,"DateTime":null}"#
        );
    }

    #[test]
    fn test_value_does_not_cross_lines() {
        let info = compiled().extract("Name:\nPlace: Lisbon");
        // `\s*` after the colon consumes the newline, `.*` stops at the next one
        assert_eq!(info.get("Name"), Some("Place: Lisbon"));
        assert_eq!(info.get("Place"), Some("Lisbon"));
    }

    #[test]
    fn test_empty_capture_reported_as_empty_string() {
        let info = compiled().extract("Place:   ");
        assert_eq!(info.get("Place"), Some(""));
    }

    #[test]
    fn test_invalid_regex_reported_as_null() {
        let patterns = vec![FieldPattern {
            key: "bad".to_string(),
            label: None,
            pattern: r"[invalid".to_string(),
            group: 1,
        }];
        let info = CompiledFields::compile(&patterns).extract("[invalid");
        assert_eq!(info.len(), 1);
        assert_eq!(info.get("bad"), None);
        assert_eq!(serde_json::to_string(&info).unwrap(), r#"{"bad":null}"#);
    }
}
