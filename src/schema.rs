//! Response types for `POST /validate`.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::extract::DocumentKind;
use crate::fields::KeyInfo;

/// Current UTC time as RFC 3339 with second precision, e.g. `2026-10-19T12:00:00Z`.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Full result of processing one upload.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub request_id: String,
    pub document: DocumentInfo,
    pub key_info: KeyInfo,
    pub summary: String,
}

/// What was received and how much text came out of it.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub stored_as: String,
    pub kind: DocumentKind,
    pub size_bytes: usize,
    pub sha256: String,
    pub text_chars: usize,
    pub processed_at: String,
}

pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_utc_second_precision() {
        let stamp = now_iso8601();
        assert!(stamp.ends_with('Z'), "got {}", stamp);
        assert_eq!(stamp.len(), "2026-10-19T12:00:00Z".len());

        let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).unwrap();
        let drift = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
        assert!(drift.num_seconds().abs() < 5);
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(new_request_id(), new_request_id());
    }
}
