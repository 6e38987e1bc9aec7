//! OCR fallback for pages without an embedded text layer
//!
//! Tesseract is the OCR engine, compiled in behind the `ocr` feature so the
//! server can be built without the native library on hosts that only serve
//! born-digital PDFs.

use crate::error::Result;

#[cfg(feature = "ocr")]
use crate::error::Error;

/// OCR engine configuration
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract language code(s), e.g. "eng" or "eng+deu"
    pub language: String,
    /// Pixel width pages are rasterized to before recognition
    pub render_width: u16,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            render_width: 1600,
        }
    }
}

/// Whether OCR support is compiled into this build
pub fn ocr_available() -> bool {
    cfg!(feature = "ocr")
}

/// Recognize text in a PNG image.
///
/// Runs synchronously and is CPU-bound; callers are expected to be on the
/// blocking pool already (the extraction pipeline is).
#[cfg(feature = "ocr")]
pub fn recognize_png(png: &[u8], config: &OcrConfig) -> Result<String> {
    let mut tess = tesseract::Tesseract::new(None, Some(&config.language))
        .map_err(|e| Error::Ocr {
            reason: format!("Failed to initialize Tesseract: {}", e),
        })?
        .set_image_from_mem(png)
        .map_err(|e| Error::Ocr {
            reason: format!("Failed to load image: {}", e),
        })?;

    let text = tess.get_text().map_err(|e| Error::Ocr {
        reason: format!("Recognition failed: {}", e),
    })?;

    Ok(text.trim().to_string())
}

#[cfg(not(feature = "ocr"))]
pub fn recognize_png(_png: &[u8], _config: &OcrConfig) -> Result<String> {
    Err(crate::error::Error::OcrUnavailable)
}
