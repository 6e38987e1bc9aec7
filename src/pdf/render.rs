//! Page rasterization for the OCR fallback

use crate::error::{Error, Result};
use crate::pdf::reader::{create_pdfium, load_document};
use crate::source::ensure_pdf_header;
use pdfium_render::prelude::*;

/// A page rendered to PNG for OCR
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Page number (1-indexed)
    pub page: u32,
    /// Grayscale PNG bytes
    pub png: Vec<u8>,
}

/// Render the given pages to grayscale PNG at a target pixel width.
/// Invalid page numbers are skipped.
pub fn render_pages_to_png(
    data: &[u8],
    password: Option<&str>,
    page_numbers: &[u32],
    target_width: u16,
) -> Result<Vec<RenderedPage>> {
    ensure_pdf_header(data, "document")?;

    let pdfium = create_pdfium()?;
    let document = load_document(&pdfium, data, password)?;

    let pages = document.pages();
    let page_count = pages.len() as u32;
    let mut rendered = Vec::with_capacity(page_numbers.len());

    let config = PdfRenderConfig::new().set_target_width(target_width as i32);

    for &page_num in page_numbers {
        if page_num < 1 || page_num > page_count {
            continue;
        }

        let page_index = page_num - 1;
        let page = pages.get(page_index as u16).map_err(|e| Error::Pdfium {
            reason: format!("Failed to get page {}: {}", page_num, e),
        })?;

        let bitmap = page.render_with_config(&config).map_err(|e| Error::Pdfium {
            reason: format!("Failed to render page {}: {}", page_num, e),
        })?;

        // Grayscale improves Tesseract accuracy and shrinks the handoff
        let gray = bitmap.as_image().grayscale();

        let mut png = Vec::new();
        gray.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| Error::Pdfium {
                reason: format!("Failed to encode page {} as PNG: {}", page_num, e),
            })?;

        rendered.push(RenderedPage {
            page: page_num,
            png,
        });
    }

    Ok(rendered)
}
