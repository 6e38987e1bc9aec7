//! Source resolution and result caching

pub mod cache;
pub mod resolver;

pub use cache::{cache_key, ResultCache};
pub use resolver::{ensure_pdf_header, resolve_base64, resolve_url, ResolvedPdf};
