//! Layout-aware text extraction via PDFium

use crate::error::{Error, Result};
use crate::source::ensure_pdf_header;
use pdfium_render::prelude::*;

/// Character with position and glyph metrics, collected from a page
#[derive(Debug, Clone)]
struct PlacedChar {
    ch: char,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// A line of characters grouped by Y proximity, sorted left to right
#[derive(Debug, Clone)]
struct Line {
    chars: Vec<PlacedChar>,
    y: f32,
    avg_height: f32,
}

/// Extracted text for one page
#[derive(Debug, Clone)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page: u32,
    /// Reading-order text, lines joined with newlines
    pub text: String,
    /// Character count of the embedded text layer. Zero means the page has
    /// no text layer at all (scanned page) and is an OCR candidate.
    pub char_count: usize,
}

/// Configuration for text extraction
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Line-gap multiplier beyond which a paragraph break is inserted
    pub paragraph_threshold: f32,
    /// Derive line/space thresholds from the median glyph height
    pub dynamic_thresholds: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            paragraph_threshold: 1.5,
            dynamic_thresholds: true,
        }
    }
}

// Fixed fallbacks when a page carries no usable glyph height data
const FALLBACK_Y_TOLERANCE: f32 = 5.0;
const FALLBACK_SPACE_THRESHOLD: f32 = 10.0;

/// Get a PDFium instance (creates a new instance each time - PDFium is not thread-safe)
pub(crate) fn create_pdfium() -> Result<Pdfium> {
    // Try to bind to a bundled library or use the system one
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Load a document, mapping PDFium password errors to our variants
pub(crate) fn load_document<'a>(
    pdfium: &'a Pdfium,
    data: &'a [u8],
    password: Option<&str>,
) -> Result<PdfDocument<'a>> {
    pdfium
        .load_pdf_from_byte_slice(data, password)
        .map_err(|e| match e {
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                if password.is_some() {
                    Error::IncorrectPassword
                } else {
                    Error::PasswordRequired
                }
            }
            _ => Error::Pdfium {
                reason: format!("{}", e),
            },
        })
}

/// Extract text from every page of a PDF, preserving reading order.
pub fn extract_pages(
    data: &[u8],
    password: Option<&str>,
    config: &ExtractionConfig,
) -> Result<Vec<PageText>> {
    ensure_pdf_header(data, "document")?;

    let pdfium = create_pdfium()?;
    let document = load_document(&pdfium, data, password)?;

    let pages = document.pages();
    let mut results = Vec::with_capacity(pages.len() as usize);

    for index in 0..pages.len() {
        let page = pages.get(index).map_err(|e| Error::Pdfium {
            reason: format!("Failed to get page {}: {}", index + 1, e),
        })?;

        let chars = collect_chars(&page);
        let char_count = chars.len();
        let text = assemble_text(chars, config);

        results.push(PageText {
            page: index as u32 + 1,
            text,
            char_count,
        });
    }

    Ok(results)
}

fn collect_chars(page: &PdfPage) -> Vec<PlacedChar> {
    let text_obj = match page.text() {
        Ok(t) => t,
        Err(_) => return Vec::new(),
    };

    let mut chars = Vec::new();
    for segment in text_obj.segments().iter() {
        if let Ok(char_iter) = segment.chars() {
            for char_result in char_iter.iter() {
                if let Some(c) = char_result.unicode_char() {
                    if let Ok(bounds) = char_result.loose_bounds() {
                        chars.push(PlacedChar {
                            ch: c,
                            x: bounds.left().value,
                            y: bounds.top().value,
                            width: bounds.width().value,
                            height: bounds.height().value,
                        });
                    }
                }
            }
        }
    }
    chars
}

/// Turn a page's characters into reading-order text
fn assemble_text(chars: Vec<PlacedChar>, config: &ExtractionConfig) -> String {
    if chars.is_empty() {
        return String::new();
    }

    let (y_tolerance, space_threshold) = if config.dynamic_thresholds {
        thresholds_from_glyphs(&chars)
    } else {
        (FALLBACK_Y_TOLERANCE, FALLBACK_SPACE_THRESHOLD)
    };

    let lines = group_into_lines(chars, y_tolerance);
    render_lines(&lines, space_threshold, config.paragraph_threshold)
}

/// Derive the same-line tolerance and word-gap threshold from the median
/// glyph height, with floors for degenerate height data.
fn thresholds_from_glyphs(chars: &[PlacedChar]) -> (f32, f32) {
    let mut heights: Vec<f32> = chars
        .iter()
        .filter(|c| c.height > 0.0)
        .map(|c| c.height)
        .collect();

    if heights.is_empty() {
        return (FALLBACK_Y_TOLERANCE, FALLBACK_SPACE_THRESHOLD);
    }

    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = heights[heights.len() / 2];

    // Y tolerance ~40% of median glyph height covers baseline jitter within
    // a line; space threshold ~30% separates words.
    let y_tolerance = (median * 0.4).max(2.0);
    let space_threshold = (median * 0.3).max(3.0);

    (y_tolerance, space_threshold)
}

/// Group characters into lines, top to bottom, each line left to right
fn group_into_lines(mut chars: Vec<PlacedChar>, y_tolerance: f32) -> Vec<Line> {
    // Sort by Y descending (PDF coordinates grow upward), then X ascending
    chars.sort_by(|a, b| {
        let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<PlacedChar> = Vec::new();
    let mut current_y: Option<f32> = None;

    for c in chars {
        match current_y {
            Some(y) if (y - c.y).abs() <= y_tolerance => current.push(c),
            _ => {
                if !current.is_empty() {
                    lines.push(finish_line(current));
                }
                current_y = Some(c.y);
                current = vec![c];
            }
        }
    }
    if !current.is_empty() {
        lines.push(finish_line(current));
    }

    lines
}

fn finish_line(mut chars: Vec<PlacedChar>) -> Line {
    let avg_height = chars.iter().map(|c| c.height).sum::<f32>() / chars.len() as f32;
    let y = chars.first().map(|c| c.y).unwrap_or(0.0);
    chars.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    Line {
        chars,
        y,
        avg_height,
    }
}

/// Render grouped lines to text with word-gap spaces and paragraph breaks
fn render_lines(lines: &[Line], space_threshold: f32, paragraph_threshold: f32) -> String {
    let mut result = String::new();
    let mut prev_y: Option<f32> = None;
    let mut prev_height: Option<f32> = None;

    for line in lines {
        if let (Some(py), Some(ph)) = (prev_y, prev_height) {
            let gap = py - line.y;
            let normal = ph.max(line.avg_height);
            if normal > 0.0 && gap > normal * paragraph_threshold {
                result.push('\n');
            }
        }

        // A gap between the previous glyph's right edge and the next glyph's
        // left edge wider than the threshold separates words.
        let mut prev_right: Option<f32> = None;
        for c in &line.chars {
            if let Some(right) = prev_right {
                if c.x - right > space_threshold && c.ch != ' ' {
                    result.push(' ');
                }
            }
            result.push(c.ch);
            prev_right = Some(c.x + c.width);
        }

        result.push('\n');
        prev_y = Some(line.y);
        prev_height = Some(line.avg_height);
    }

    result.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ch(c: char, x: f32, y: f32, height: f32) -> PlacedChar {
        PlacedChar {
            ch: c,
            x,
            y,
            width: height * 0.5,
            height,
        }
    }

    /// Glyphs laid out back-to-back: each char's left edge starts where the
    /// previous one ends.
    fn word(s: &str, x0: f32, y: f32, height: f32) -> Vec<PlacedChar> {
        s.chars()
            .enumerate()
            .map(|(i, c)| ch(c, x0 + i as f32 * height * 0.5, y, height))
            .collect()
    }

    #[test]
    fn test_invalid_pdf_detection() {
        let result = extract_pages(b"not a pdf", None, &ExtractionConfig::default());
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_assemble_empty_page() {
        assert_eq!(assemble_text(Vec::new(), &ExtractionConfig::default()), "");
    }

    #[test]
    fn test_lines_ordered_top_to_bottom() {
        let mut chars = word("below", 10.0, 700.0, 10.0);
        chars.extend(word("above", 10.0, 714.0, 10.0));
        let text = assemble_text(chars, &ExtractionConfig::default());
        assert_eq!(text, "above\nbelow");
    }

    #[test]
    fn test_word_gap_inserts_space() {
        // Two words on one line, separated by a gap wider than the space
        // threshold derived from the 10pt glyphs.
        let mut chars = word("left", 10.0, 700.0, 10.0);
        chars.extend(word("right", 60.0, 700.0, 10.0));
        let text = assemble_text(chars, &ExtractionConfig::default());
        assert_eq!(text, "left right");
    }

    #[test]
    fn test_baseline_jitter_stays_on_one_line() {
        // 1pt of jitter on 10pt glyphs is within the dynamic tolerance
        let mut chars = word("ab", 10.0, 700.0, 10.0);
        chars.extend(word("cd", 22.0, 701.0, 10.0));
        let text = assemble_text(chars, &ExtractionConfig::default());
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_paragraph_break_on_large_gap() {
        let mut chars = word("first", 10.0, 700.0, 10.0);
        // 30pt gap on 10pt lines exceeds the 1.5x paragraph threshold
        chars.extend(word("second", 10.0, 670.0, 10.0));
        let text = assemble_text(chars, &ExtractionConfig::default());
        assert_eq!(text, "first\n\nsecond");
    }

    #[test]
    fn test_fixed_thresholds_when_dynamic_disabled() {
        let config = ExtractionConfig {
            dynamic_thresholds: false,
            ..Default::default()
        };
        let mut chars = word("one", 10.0, 700.0, 10.0);
        chars.extend(word("two", 50.0, 700.0, 10.0));
        let text = assemble_text(chars, &config);
        assert_eq!(text, "one two");
    }

    #[test]
    fn test_thresholds_fall_back_without_heights() {
        let chars = vec![ch('a', 0.0, 0.0, 0.0)];
        assert_eq!(
            thresholds_from_glyphs(&chars),
            (FALLBACK_Y_TOLERANCE, FALLBACK_SPACE_THRESHOLD)
        );
    }
}
