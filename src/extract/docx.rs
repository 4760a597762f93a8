//! DOCX text extraction via docx-rs.

use anyhow::Result;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};

/// Extract paragraph text from a DOCX file, one line per paragraph.
///
/// Only top-level body paragraphs are read; tables and hyperlink runs are
/// skipped.
pub fn extract_docx_text(data: &[u8]) -> Result<String> {
    let doc = docx_rs::read_docx(data)
        .map_err(|e| anyhow::anyhow!("Failed to read DOCX: {}", e))?;

    let mut text = String::new();
    for child in doc.document.children {
        if let DocumentChild::Paragraph(p) = child {
            for child in p.children {
                if let ParagraphChild::Run(run) = child {
                    for child in run.children {
                        match child {
                            RunChild::Text(t) => text.push_str(&t.text),
                            RunChild::Tab(_) => text.push('\t'),
                            RunChild::Break(_) => text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            text.push('\n');
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for p in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_one_line_per_paragraph() {
        let data = build_docx(&["Name: Jane Doe", "", "Place: Porto"]);
        let text = extract_docx_text(&data).unwrap();
        assert_eq!(text, "Name: Jane Doe\n\nPlace: Porto\n");
    }

    #[test]
    fn test_not_a_zip_is_error() {
        assert!(extract_docx_text(b"plain text pretending").is_err());
    }
}
