//! Upload processing: save, extract text, pull key fields, summarize.

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::extract::{DocumentKind, TextExtractor};
use crate::fields::CompiledFields;
use crate::schema::{new_request_id, now_iso8601, DocumentInfo, ValidationReport};
use crate::summarizer::{summarize_document, Summarizer};
use crate::upload::{sanitize_filename, UploadStore};

/// Pipeline orchestrator, shared across requests.
pub struct Pipeline {
    uploads: UploadStore,
    extractor: TextExtractor,
    fields: CompiledFields,
    summarizer: Arc<dyn Summarizer>,
}

impl Pipeline {
    pub fn new(
        uploads: UploadStore,
        extractor: TextExtractor,
        fields: CompiledFields,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            uploads,
            extractor,
            fields,
            summarizer,
        }
    }

    pub async fn run(&self, filename: &str, data: &[u8]) -> Result<ValidationReport> {
        let request_id = new_request_id();
        let span = info_span!("validate", request_id = %request_id, filename = %filename);
        self.process(request_id, filename, data).instrument(span).await
    }

    async fn process(
        &self,
        request_id: String,
        filename: &str,
        data: &[u8],
    ) -> Result<ValidationReport> {
        let stored = self.uploads.save(filename, data).await?;
        let kind = DocumentKind::from_filename(&sanitize_filename(filename));
        info!("Stored {:?} ({} bytes) as {:?}", stored, data.len(), kind);

        let text = self.extractor.extract(kind, data).await?;
        let text_chars = text.chars().count();

        let key_info = self.fields.extract(&text);
        info!("Key fields: {}/{} found", key_info.found(), key_info.len());

        let summary = summarize_document(self.summarizer.as_ref(), &text).await;

        let sha256 = {
            let mut hasher = Sha256::new();
            hasher.update(data);
            format!("{:x}", hasher.finalize())
        };

        Ok(ValidationReport {
            request_id,
            document: DocumentInfo {
                filename: filename.to_string(),
                stored_as: stored.display().to_string(),
                kind,
                size_bytes: data.len(),
                sha256,
                text_chars,
                processed_at: now_iso8601(),
            },
            key_info,
            summary,
        })
    }
}
