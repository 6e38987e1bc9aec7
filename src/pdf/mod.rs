//! PDF processing layer
//!
//! Text extraction and page rasterization on top of PDFium.

mod reader;
mod render;

pub use reader::{extract_pages, ExtractionConfig, PageText};
pub use render::{render_pages_to_png, RenderedPage};
