//! Service configuration.
//!
//! Everything comes from the environment (after `.env` is loaded). Key-field
//! patterns can additionally be overridden from a JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_SUMMARY_MODEL: &str = "facebook/bart-large-cnn";
const DEFAULT_HF_API_BASE: &str = "https://router.huggingface.co/hf-inference/models";
const DEFAULT_OCR_LANG: &str = "eng";

/// Which summarization backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarizerKind {
    HfInference,
    OpenRouter,
}

impl SummarizerKind {
    /// Parse an environment value into a backend kind.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hf_inference" => Some(Self::HfInference),
            "openrouter" => Some(Self::OpenRouter),
            _ => None,
        }
    }

    /// Model used when `SUMMARY_MODEL` is not set.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::HfInference => DEFAULT_SUMMARY_MODEL,
            Self::OpenRouter => crate::summarizer::openrouter::DEFAULT_MODEL,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub summarizer: SummarizerKind,
    pub summary_model: String,
    pub hf_api_base: String,
    pub hf_token: Option<String>,
    pub ocr_lang: String,
    pub field_patterns: Vec<FieldPattern>,
}

impl AppConfig {
    /// Build the config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("MAX_UPLOAD_BYTES is not a number: {}", raw))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let summarizer_name = var("SUMMARIZER").unwrap_or_else(|| "hf_inference".to_string());
        let summarizer = SummarizerKind::from_str(&summarizer_name).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown SUMMARIZER: {}. Available: hf_inference, openrouter",
                summarizer_name
            )
        })?;

        let field_patterns = match var("FIELD_PATTERNS_PATH") {
            Some(path) => load_field_patterns(Path::new(&path))?,
            None => default_field_patterns(),
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            upload_dir: var("UPLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())
                .into(),
            max_upload_bytes,
            summarizer,
            summary_model: var("SUMMARY_MODEL")
                .unwrap_or_else(|| summarizer.default_model().to_string()),
            hf_api_base: var("HF_API_BASE").unwrap_or_else(|| DEFAULT_HF_API_BASE.to_string()),
            hf_token: var("HF_TOKEN").filter(|t| !t.is_empty()),
            ocr_lang: var("OCR_LANG").unwrap_or_else(|| DEFAULT_OCR_LANG.to_string()),
            field_patterns,
        })
    }
}

/// A regex used to pull one key field out of the document text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPattern {
    /// Key reported in `key_info` (e.g. "Name", "DOB")
    pub key: String,
    /// Human-readable label
    #[serde(default)]
    pub label: Option<String>,
    /// Regex pattern string, matched case-insensitively
    pub pattern: String,
    /// Capture group holding the value
    #[serde(default = "default_group")]
    pub group: usize,
}

fn default_group() -> usize {
    1
}

/// Load field patterns from a JSON array on disk.
pub fn load_field_patterns(path: &Path) -> Result<Vec<FieldPattern>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read field patterns: {:?}", path))?;

    let patterns: Vec<FieldPattern> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse field patterns: {:?}", path))?;

    if patterns.is_empty() {
        anyhow::bail!("No field patterns found in {:?}", path);
    }

    info!("Loaded {} field patterns from {:?}", patterns.len(), path);
    Ok(patterns)
}

/// Built-in patterns: name, date of birth, institution, place, date & time.
pub fn default_field_patterns() -> Vec<FieldPattern> {
    let field = |key: &str, label: &str, pattern: &str, group: usize| FieldPattern {
        key: key.to_string(),
        label: Some(label.to_string()),
        pattern: pattern.to_string(),
        group,
    };

    vec![
        field("Name", "Name", r"Name\s*[:\-]\s*(.*)", 1),
        field(
            "DOB",
            "Date of birth",
            r"(Date of Birth|DOB)\s*[:\-]\s*(\d{2}[/\-]\d{2}[/\-]\d{4})",
            2,
        ),
        field(
            "Institution",
            "Institution",
            r"(Institution|College|University)\s*[:\-]\s*(.*)",
            2,
        ),
        field("Place", "Place", r"(Place)\s*[:\-]\s*(.*)", 2),
        field(
            "DateTime",
            "Date & time",
            r"(Date\s*[:\-]\s*\d{2}[/\-]\d{2}[/\-]\d{4}.*Time\s*[:\-]\s*\d{2}:\d{2})",
            1,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.summarizer, SummarizerKind::HfInference);
        assert_eq!(config.summary_model, "facebook/bart-large-cnn");
        assert!(config.hf_token.is_none());
        assert_eq!(config.ocr_lang, "eng");
        assert_eq!(config.field_patterns.len(), 5);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SUMMARIZER", "openrouter"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("HF_TOKEN", ""),
            ("OCR_LANG", "por"),
        ]))
        .unwrap();
        assert_eq!(config.summarizer, SummarizerKind::OpenRouter);
        assert_eq!(config.summary_model, SummarizerKind::OpenRouter.default_model());
        assert_eq!(config.max_upload_bytes, 1024);
        assert!(config.hf_token.is_none());
        assert_eq!(config.ocr_lang, "por");
    }

    #[test]
    fn test_unknown_summarizer_is_error() {
        let err = AppConfig::from_lookup(lookup(&[("SUMMARIZER", "bart")])).unwrap_err();
        assert!(err.to_string().contains("Unknown SUMMARIZER: bart"));
    }

    #[test]
    fn test_unparsable_max_upload_bytes_is_error() {
        let err = AppConfig::from_lookup(lookup(&[("MAX_UPLOAD_BYTES", "25MB")])).unwrap_err();
        assert!(err.to_string().contains("MAX_UPLOAD_BYTES is not a number: 25MB"));
    }

    #[test]
    fn test_summarizer_kind_from_str() {
        assert_eq!(
            SummarizerKind::from_str("hf_inference"),
            Some(SummarizerKind::HfInference)
        );
        assert_eq!(
            SummarizerKind::from_str("openrouter"),
            Some(SummarizerKind::OpenRouter)
        );
        assert_eq!(SummarizerKind::from_str("bart"), None);
    }

    #[test]
    fn test_default_model_per_backend() {
        assert_eq!(
            SummarizerKind::HfInference.default_model(),
            "facebook/bart-large-cnn"
        );
        assert_ne!(
            SummarizerKind::OpenRouter.default_model(),
            "facebook/bart-large-cnn"
        );
    }

    #[test]
    fn test_default_patterns_keys_in_order() {
        let keys: Vec<String> = default_field_patterns().into_iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["Name", "DOB", "Institution", "Place", "DateTime"]);
    }

    #[test]
    fn test_load_field_patterns_defaults_group() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"key": "Roll", "pattern": "Roll No\\s*:\\s*(\\d+)"}}]"#).unwrap();

        let patterns = load_field_patterns(file.path()).unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].key, "Roll");
        assert_eq!(patterns[0].group, 1);
        assert!(patterns[0].label.is_none());
    }

    #[test]
    fn test_load_field_patterns_rejects_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(load_field_patterns(file.path()).is_err());
    }
}
