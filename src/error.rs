//! Error types for the PDF redaction server

use thiserror::Error;

/// Result type alias for the PDF redaction server
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the PDF redaction server
#[derive(Error, Debug)]
pub enum Error {
    /// Request is missing a PDF source or supplies conflicting ones
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected and no password was provided
    #[error("PDF is password protected")]
    PasswordRequired,

    /// Incorrect password provided
    #[error("Incorrect password")]
    IncorrectPassword,

    /// Source resolution error
    #[error("Failed to resolve source: {reason}")]
    SourceResolution { reason: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// OCR engine error
    #[error("OCR failed: {reason}")]
    Ocr { reason: String },

    /// OCR requested but the engine is not compiled in
    #[error("OCR support is not available in this build")]
    OcrUnavailable,

    /// SSRF blocked (URL resolves to private/reserved IP)
    #[error("SSRF blocked: {url}")]
    SsrfBlocked { url: String },

    /// Download too large
    #[error("Download too large: {size} bytes (max: {max_size} bytes)")]
    DownloadTooLarge { size: u64, max_size: u64 },

    /// Uploaded payload too large
    #[error("Payload too large: {size} bytes (max: {max_size} bytes)")]
    PayloadTooLarge { size: u64, max_size: u64 },
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Internal details (URLs, library errors, exact sizes) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidRequest { reason } => reason.clone(),
            Error::InvalidPdf { .. } => "Invalid PDF file".to_string(),
            Error::PasswordRequired => "PDF is password protected".to_string(),
            Error::IncorrectPassword => "Incorrect password".to_string(),
            Error::SourceResolution { .. } => "Failed to resolve PDF source".to_string(),
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::HttpRequest(_) => "Failed to fetch PDF from URL".to_string(),
            Error::Pdfium { .. } => "PDF processing error".to_string(),
            Error::Ocr { .. } => "OCR processing error".to_string(),
            Error::OcrUnavailable => "OCR support is not available".to_string(),
            Error::SsrfBlocked { .. } => "URL not allowed".to_string(),
            Error::DownloadTooLarge { max_size, .. } => {
                format!("Download exceeds maximum size of {} bytes", max_size)
            }
            Error::PayloadTooLarge { max_size, .. } => {
                format!("Payload exceeds maximum size of {} bytes", max_size)
            }
        }
    }
}
