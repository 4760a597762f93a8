//! PDF text extraction via lopdf.

use anyhow::Result;
use lopdf::Document;
use std::io::Cursor;
use tracing::warn;

/// Extract text from a PDF, page by page in page order.
///
/// Pages lopdf cannot decode are skipped; a document that fails to load at
/// all is an error.
pub fn extract_pdf_text(data: &[u8]) -> Result<String> {
    let doc = Document::load_from(Cursor::new(data))
        .map_err(|e| anyhow::anyhow!("Failed to load PDF: {}", e))?;

    let mut text = String::new();
    let pages = doc.get_pages();

    for (page_num, _) in pages {
        match doc.extract_text(&[page_num]) {
            Ok(content) => {
                text.push_str(&content);
                text.push('\n');
            }
            Err(e) => warn!("Skipping PDF page {}: {}", page_num, e),
        }
    }

    Ok(text)
}
