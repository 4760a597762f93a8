//! On-disk storage for uploaded documents.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory the raw uploads are written to.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the store, creating `dir` if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create upload directory: {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` under the sanitized form of `filename`, replacing any
    /// previous upload with the same name.
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(sanitize_filename(filename));
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to save upload: {:?}", path))?;
        debug!("UploadStore: wrote {:?} ({} bytes)", path, data.len());
        Ok(path)
    }
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Directory components are dropped, whitespace runs become a single `_`,
/// and anything outside `[A-Za-z0-9._-]` is replaced with `_`. Leading and
/// trailing `.`/`_` are trimmed so the result can never be `..` or hidden.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut out = String::with_capacity(base.len());
    let mut in_whitespace = false;
    for c in base.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
        } else {
            out.push('_');
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}
