//! Extraction pipeline
//!
//! Orchestrates embedded-text extraction, the per-page OCR fallback, and the
//! redaction pass. Everything here is synchronous and CPU-bound; the HTTP
//! layer runs it on the blocking pool. PDFium is not thread-safe, so each
//! call works with its own instance.

use crate::error::Result;
use crate::ocr::{ocr_available, recognize_png, OcrConfig};
use crate::pdf::{extract_pages, render_pages_to_png, ExtractionConfig, PageText};
use crate::redact::{redact_text, RedactionSummary};
use tracing::{debug, warn};

/// Per-request options
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Apply the PII redaction pass
    pub redact: bool,
    /// Allow the OCR fallback for pages without a text layer
    pub ocr: bool,
    /// Password for encrypted PDFs
    pub password: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            redact: true,
            ocr: true,
            password: None,
        }
    }
}

impl ExtractOptions {
    /// Stable fingerprint for cache keying. The password itself is not part
    /// of the key; decryption either succeeds identically or fails.
    pub fn fingerprint(&self) -> String {
        format!(
            "redact={},ocr={},pw={}",
            self.redact,
            self.ocr,
            self.password.is_some()
        )
    }
}

/// Pipeline configuration (extraction, OCR trigger, OCR engine)
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub extraction: ExtractionConfig,
    pub ocr: OcrConfig,
    /// Pages whose embedded text layer has fewer characters than this are
    /// rasterized and OCR'd
    pub ocr_min_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            ocr: OcrConfig::default(),
            ocr_min_chars: 16,
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Final (possibly redacted) text
    pub text: String,
    /// Number of pages in the document
    pub page_count: u32,
    /// Number of pages whose text came from OCR
    pub ocr_page_count: u32,
    /// Redaction counts, present when the redaction pass ran
    pub redactions: Option<RedactionSummary>,
}

/// Run the full pipeline over raw PDF bytes.
pub fn extract_and_redact(
    data: &[u8],
    opts: &ExtractOptions,
    config: &PipelineConfig,
) -> Result<ExtractionOutcome> {
    let password = opts.password.as_deref();

    let mut pages = extract_pages(data, password, &config.extraction)?;
    let page_count = pages.len() as u32;

    let ocr_page_count = if opts.ocr {
        run_ocr_fallback(data, password, &mut pages, config)?
    } else {
        0
    };

    let text = join_pages(&pages);

    let (text, redactions) = if opts.redact {
        let (cleaned, summary) = redact_text(&text);
        (cleaned, Some(summary))
    } else {
        (text, None)
    };

    Ok(ExtractionOutcome {
        text,
        page_count,
        ocr_page_count,
        redactions,
    })
}

/// OCR every page whose embedded text layer is below the trigger threshold.
/// Returns the number of pages whose text was replaced.
fn run_ocr_fallback(
    data: &[u8],
    password: Option<&str>,
    pages: &mut [PageText],
    config: &PipelineConfig,
) -> Result<u32> {
    let candidates: Vec<u32> = pages
        .iter()
        .filter(|p| p.char_count < config.ocr_min_chars)
        .map(|p| p.page)
        .collect();

    if candidates.is_empty() {
        return Ok(0);
    }

    if !ocr_available() {
        warn!(
            pages = candidates.len(),
            "pages need OCR but this build has no OCR support; returning embedded text only"
        );
        return Ok(0);
    }

    debug!(pages = ?candidates, "running OCR fallback");

    let rendered = render_pages_to_png(data, password, &candidates, config.ocr.render_width)?;

    let mut replaced = 0u32;
    for page_image in rendered {
        match recognize_png(&page_image.png, &config.ocr) {
            Ok(text) if !text.is_empty() => {
                if let Some(page) = pages.iter_mut().find(|p| p.page == page_image.page) {
                    page.text = text;
                    replaced += 1;
                }
            }
            Ok(_) => {
                debug!(page = page_image.page, "OCR produced no text");
            }
            Err(e) => {
                // One bad page should not sink the document
                warn!(page = page_image.page, error = %e, "OCR failed for page");
            }
        }
    }

    Ok(replaced)
}

/// Join page texts: each page contributes its text plus a newline, and the
/// result is trimmed. Pages without text become blank lines, preserving
/// page boundaries in the output.
fn join_pages(pages: &[PageText]) -> String {
    let mut combined = String::new();
    for page in pages {
        combined.push_str(&page.text);
        combined.push('\n');
    }
    combined.trim().to_string()
}
