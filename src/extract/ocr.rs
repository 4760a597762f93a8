//! Image OCR.
//!
//! [`OcrEngine`] abstracts the recognizer so the pipeline can be exercised
//! without a native OCR install. The production engine shells out to the
//! `tesseract` CLI.

use anyhow::{Context, Result};
use image::ImageFormat;
use tokio::process::Command;
use tracing::{debug, info};

/// Async trait implemented by each OCR backend.
#[async_trait::async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;
    async fn is_available(&self) -> bool;
    async fn recognize(&self, image: &[u8]) -> Result<String>;
}

/// Tesseract invoked as a subprocess.
pub struct TesseractCli {
    lang: String,
}

impl TesseractCli {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }
}

#[async_trait::async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        Command::new("tesseract")
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn recognize(&self, image: &[u8]) -> Result<String> {
        let data = image.to_vec();
        // Decoding and re-encoding is CPU bound.
        let png = tokio::task::spawn_blocking(move || prepare_image(&data))
            .await
            .context("Image preprocessing task panicked")??;

        let output = Command::new("tesseract")
            .arg(png.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to run tesseract (is tesseract-ocr installed?)")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tesseract failed ({}): {}", output.status, stderr.trim());
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        info!("TesseractCli: recognized {} chars (lang={})", text.len(), self.lang);
        Ok(text)
    }
}

/// Decode the upload, convert it to grayscale and write it out as a PNG
/// tesseract can read regardless of the original format.
fn prepare_image(data: &[u8]) -> Result<tempfile::NamedTempFile> {
    let img = image::load_from_memory(data).context("Failed to decode image")?;
    debug!("Decoded image {}x{}", img.width(), img.height());

    let file = tempfile::Builder::new()
        .prefix("ocr-")
        .suffix(".png")
        .tempfile()
        .context("Failed to create temp file for OCR")?;

    img.grayscale()
        .save_with_format(file.path(), ImageFormat::Png)
        .context("Failed to write OCR input image")?;

    Ok(file)
}
