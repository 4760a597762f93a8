//! Text extraction for uploaded documents.
//!
//! The document kind is picked from the file extension; each kind has its own
//! backend (plain UTF-8, lopdf, docx-rs, or an [`OcrEngine`] for images).

pub mod docx;
pub mod ocr;
pub mod pdf;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub use ocr::{OcrEngine, TesseractCli};

/// Supported document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Text,
    Pdf,
    Docx,
    Image,
    Unsupported,
}

impl DocumentKind {
    /// Classify by lowercase extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Self::Text,
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "jpg" | "jpeg" | "png" | "tiff" | "tif" | "bmp" => Self::Image,
            _ => Self::Unsupported,
        }
    }

    pub fn from_filename(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unsupported)
    }
}

/// Dispatches raw document bytes to the right extraction backend.
#[derive(Clone)]
pub struct TextExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl TextExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    pub fn ocr_name(&self) -> &str {
        self.ocr.name()
    }

    pub async fn ocr_available(&self) -> bool {
        self.ocr.is_available().await
    }

    /// Extract text from `data` according to `kind`. The result is trimmed;
    /// unsupported kinds produce an empty string.
    pub async fn extract(&self, kind: DocumentKind, data: &[u8]) -> Result<String> {
        let text = match kind {
            DocumentKind::Text => decode_utf8_dropping_invalid(data),
            DocumentKind::Pdf => {
                let data = data.to_vec();
                tokio::task::spawn_blocking(move || pdf::extract_pdf_text(&data))
                    .await
                    .context("PDF extraction task panicked")??
            }
            DocumentKind::Docx => {
                let data = data.to_vec();
                tokio::task::spawn_blocking(move || docx::extract_docx_text(&data))
                    .await
                    .context("DOCX extraction task panicked")??
            }
            DocumentKind::Image => self.ocr.recognize(data).await?,
            DocumentKind::Unsupported => {
                warn!("Unsupported document type, no text extracted");
                String::new()
            }
        };

        let trimmed = text.trim();
        debug!("Extracted {} chars from {:?} document", trimmed.chars().count(), kind);
        Ok(trimmed.to_string())
    }
}

/// Decode UTF-8, silently dropping invalid byte sequences.
fn decode_utf8_dropping_invalid(data: &[u8]) -> String {
    data.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// OCR stand-in returning canned text.
    pub(crate) struct FixedOcr(pub &'static str);

    #[async_trait::async_trait]
    impl OcrEngine for FixedOcr {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn recognize(&self, _image: &[u8]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn extractor() -> TextExtractor {
        TextExtractor::new(Arc::new(FixedOcr("  Name: From Image \n")))
    }

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("a.TXT"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_filename("scan.Pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("cv.docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_filename("id.jpeg"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_filename("id.tif"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_filename("old.doc"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_filename("README"), DocumentKind::Unsupported);
    }

    #[tokio::test]
    async fn test_text_drops_invalid_bytes_and_trims() {
        let data = b"\n  Name: Ja\xffne Doe  \n\n";
        let text = extractor().extract(DocumentKind::Text, data).await.unwrap();
        assert_eq!(text, "Name: Jane Doe");
    }

    #[test]
    fn test_decode_keeps_valid_multibyte_and_replacement_chars() {
        // A literal U+FFFD in the input is valid UTF-8 and must survive.
        let mut data = "Olá \u{FFFD} ".as_bytes().to_vec();
        data.extend_from_slice(b"\xc3(\xe2\x82fim");
        assert_eq!(decode_utf8_dropping_invalid(&data), "Olá \u{FFFD} (fim");
    }

    #[tokio::test]
    async fn test_image_goes_through_ocr() {
        let text = extractor().extract(DocumentKind::Image, b"png").await.unwrap();
        assert_eq!(text, "Name: From Image");
    }

    #[tokio::test]
    async fn test_unsupported_yields_empty() {
        let text = extractor()
            .extract(DocumentKind::Unsupported, b"binary")
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_docx_extracted_off_the_runtime() {
        use docx_rs::{Docx, Paragraph, Run};

        let mut cursor = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("  Place: Coimbra")))
            .build()
            .pack(&mut cursor)
            .unwrap();

        let text = extractor()
            .extract(DocumentKind::Docx, cursor.get_ref())
            .await
            .unwrap();
        assert_eq!(text, "Place: Coimbra");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_error() {
        assert!(extractor()
            .extract(DocumentKind::Pdf, b"not a pdf")
            .await
            .is_err());
    }
}
