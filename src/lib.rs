//! PDF Redaction Server Library
//!
//! This crate provides an HTTP service for PDF text processing:
//! - `POST /extract`: extract text from a base64 payload or URL
//! - `POST /extract/file`: extract text from a multipart upload
//! - `GET /health`: service health
//!
//! Extraction uses PDFium's embedded text layer, falls back to Tesseract
//! OCR for scanned pages, and applies a heuristic PII redaction pass to
//! the result.

pub mod error;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod redact;
pub mod server;
pub mod source;

pub use error::{Error, Result};
pub use pipeline::{extract_and_redact, ExtractOptions, ExtractionOutcome, PipelineConfig};
pub use redact::{redact_text, RedactionSummary};
pub use server::{
    create_router, run_server, run_server_with_config, AppState, ExtractRequest, ExtractResponse,
    ServerConfig, SharedState,
};
