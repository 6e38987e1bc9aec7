//! HTTP server implementation using axum

use crate::error::{Error, Result};
use crate::ocr::ocr_available;
use crate::pipeline::{extract_and_redact, ExtractOptions, ExtractionOutcome, PipelineConfig};
use crate::redact::RedactionSummary;
use crate::source::{cache_key, ensure_pdf_header, resolve_base64, resolve_url, ResultCache};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Security and resource configuration for the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind (default: 3000)
    pub port: u16,
    /// Maximum request body size in bytes (default: 50MB)
    pub max_upload_bytes: usize,
    /// Allow URLs that resolve to private/reserved IPs (default: false)
    pub allow_private_urls: bool,
    /// Maximum download size in bytes for URL sources (default: 100MB)
    pub max_download_bytes: u64,
    /// Maximum number of cached extraction results (default: 100)
    pub cache_max_entries: usize,
    /// Maximum total text bytes in the result cache (default: 64MB)
    pub cache_max_bytes: usize,
    /// Extraction / OCR pipeline settings
    pub pipeline: PipelineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_upload_bytes: 50 * 1024 * 1024,     // 50MB
            allow_private_urls: false,
            max_download_bytes: 100 * 1024 * 1024,  // 100MB
            cache_max_entries: 100,
            cache_max_bytes: 64 * 1024 * 1024,      // 64MB
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build a config from environment variables, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(port) = env_parse::<u16>("SERVER_PORT") {
            config.port = port;
        }
        if let Some(bytes) = env_parse::<usize>("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = bytes;
        }
        if let Some(allow) = env_parse::<bool>("ALLOW_PRIVATE_URLS") {
            config.allow_private_urls = allow;
        }
        if let Some(bytes) = env_parse::<u64>("MAX_DOWNLOAD_BYTES") {
            config.max_download_bytes = bytes;
        }
        if let Some(entries) = env_parse::<usize>("CACHE_MAX_ENTRIES") {
            config.cache_max_entries = entries;
        }
        if let Some(bytes) = env_parse::<usize>("CACHE_MAX_BYTES") {
            config.cache_max_bytes = bytes;
        }
        if let Ok(lang) = std::env::var("OCR_LANGUAGE") {
            if !lang.trim().is_empty() {
                config.pipeline.ocr.language = lang;
            }
        }
        if let Some(width) = env_parse::<u16>("OCR_RENDER_WIDTH") {
            config.pipeline.ocr.render_width = width;
        }
        if let Some(chars) = env_parse::<usize>("OCR_MIN_CHARS") {
            config.pipeline.ocr_min_chars = chars;
        }

        config
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    pub cache: ResultCache,
}

pub type SharedState = Arc<AppState>;

// ============================================================================
// Request/Response types
// ============================================================================

/// JSON body for POST /extract
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// Base64-encoded PDF bytes
    #[serde(default)]
    pub file_base64: Option<String>,
    /// URL to fetch the PDF from
    #[serde(default)]
    pub file_url: Option<String>,
    /// Apply the PII redaction pass (default: true)
    #[serde(default = "default_true")]
    pub redact: bool,
    /// Allow the OCR fallback (default: true)
    #[serde(default = "default_true")]
    pub ocr: bool,
    /// Password for encrypted PDFs
    #[serde(default)]
    pub password: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ExtractRequest {
    fn options(&self) -> ExtractOptions {
        ExtractOptions {
            redact: self.redact,
            ocr: self.ocr,
            password: self.password.clone(),
        }
    }
}

/// Successful extraction response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub success: bool,
    /// Extracted (and possibly redacted) text
    pub text: String,
    pub page_count: u32,
    /// Pages whose text came from the OCR fallback
    pub ocr_page_count: u32,
    /// Redaction counts; omitted when redaction was disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redactions: Option<RedactionSummary>,
    /// Whether this result was served from the cache
    pub cached: bool,
}

impl ExtractResponse {
    fn from_outcome(outcome: ExtractionOutcome, cached: bool) -> Self {
        Self {
            success: true,
            text: outcome.text,
            page_count: outcome.page_count,
            ocr_page_count: outcome.ocr_page_count,
            redactions: outcome.redactions,
            cached,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub ocr_available: bool,
    pub cached_documents: usize,
}

/// Error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl Error {
    /// HTTP status for this error
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest { .. } | Error::InvalidPdf { .. } | Error::Base64Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::PasswordRequired | Error::IncorrectPassword => StatusCode::UNPROCESSABLE_ENTITY,
            Error::PayloadTooLarge { .. } | Error::DownloadTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Error::SsrfBlocked { .. } => StatusCode::FORBIDDEN,
            Error::HttpRequest(_) | Error::SourceResolution { .. } => StatusCode::BAD_GATEWAY,
            Error::OcrUnavailable => StatusCode::NOT_IMPLEMENTED,
            Error::Pdfium { .. } | Error::Ocr { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full detail server-side; clients get the sanitized message
        warn!(error = %self, "request failed");
        let body = ErrorResponse {
            success: false,
            error: self.client_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "pdf-redact-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr_available: ocr_available(),
        cached_documents: state.cache.len(),
    })
}

/// POST /extract: JSON body with a base64 payload or a URL
pub async fn extract(
    State(state): State<SharedState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>> {
    let data = match (&request.file_base64, &request.file_url) {
        (Some(_), Some(_)) => {
            return Err(Error::InvalidRequest {
                reason: "provide either fileBase64 or fileUrl, not both".to_string(),
            })
        }
        (Some(b64), None) => resolve_base64(b64)?.data,
        (None, Some(url)) => {
            resolve_url(
                url,
                state.config.allow_private_urls,
                state.config.max_download_bytes,
            )
            .await?
            .data
        }
        (None, None) => {
            return Err(Error::InvalidRequest {
                reason: "fileBase64 is required".to_string(),
            })
        }
    };

    run_extraction(state, data, request.options()).await.map(Json)
}

/// POST /extract/file: multipart form (file, redact, ocr, password)
pub async fn extract_file(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut opts = ExtractOptions::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::InvalidRequest {
        reason: format!("Multipart parse error: {}", e),
    })? {
        match field.name() {
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::InvalidRequest {
                        reason: format!("Failed to read file bytes: {}", e),
                    })?
                    .to_vec();
                if data.is_empty() {
                    return Err(Error::InvalidRequest {
                        reason: "Uploaded file is empty".to_string(),
                    });
                }
                file_bytes = Some(data);
            }
            Some("redact") => {
                opts.redact = read_bool_field(field, "redact").await?;
            }
            Some("ocr") => {
                opts.ocr = read_bool_field(field, "ocr").await?;
            }
            Some("password") => {
                let txt = field.text().await.map_err(|e| Error::InvalidRequest {
                    reason: format!("Failed to read password: {}", e),
                })?;
                if !txt.is_empty() {
                    opts.password = Some(txt);
                }
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = file_bytes.ok_or_else(|| Error::InvalidRequest {
        reason: "Missing 'file' field in multipart".to_string(),
    })?;
    ensure_pdf_header(&data, "uploaded file")?;

    run_extraction(state, data, opts).await.map(Json)
}

async fn read_bool_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<bool> {
    let txt = field.text().await.map_err(|e| Error::InvalidRequest {
        reason: format!("Failed to read {}: {}", name, e),
    })?;
    txt.trim().parse().map_err(|_| Error::InvalidRequest {
        reason: format!("Field '{}' must be \"true\" or \"false\"", name),
    })
}

/// Shared tail of both extract handlers: size check, cache lookup, blocking
/// pipeline run, cache fill.
async fn run_extraction(
    state: SharedState,
    data: Vec<u8>,
    opts: ExtractOptions,
) -> Result<ExtractResponse> {
    if data.len() > state.config.max_upload_bytes {
        return Err(Error::PayloadTooLarge {
            size: data.len() as u64,
            max_size: state.config.max_upload_bytes as u64,
        });
    }

    let request_id = uuid::Uuid::new_v4();
    let key = cache_key(&data, &opts.fingerprint());

    if let Some(outcome) = state.cache.get(&key) {
        debug!(%request_id, "serving extraction from cache");
        return Ok(ExtractResponse::from_outcome(outcome, true));
    }

    info!(
        %request_id,
        bytes = data.len(),
        redact = opts.redact,
        ocr = opts.ocr,
        "starting extraction"
    );

    let pipeline_config = state.config.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        extract_and_redact(&data, &opts, &pipeline_config)
    })
    .await
    .map_err(|e| Error::Pdfium {
        reason: format!("Extraction task failed: {}", e),
    })??;

    info!(
        %request_id,
        pages = outcome.page_count,
        ocr_pages = outcome.ocr_page_count,
        redactions = outcome.redactions.as_ref().map(|r| r.total()).unwrap_or(0),
        "extraction complete"
    );

    state.cache.put(key, outcome.clone());

    Ok(ExtractResponse::from_outcome(outcome, false))
}

// ============================================================================
// Router / startup
// ============================================================================

/// Create the API router with all routes configured
pub fn create_router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract))
        .route("/extract/file", post(extract_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Build shared state from a config
pub fn build_state(config: ServerConfig) -> SharedState {
    let cache = ResultCache::new(config.cache_max_entries, config.cache_max_bytes);
    Arc::new(AppState { config, cache })
}

/// Run the server with default configuration
pub async fn run_server() -> anyhow::Result<()> {
    run_server_with_config(ServerConfig::default()).await
}

/// Run the server with the given configuration
pub async fn run_server_with_config(config: ServerConfig) -> anyhow::Result<()> {
    let port = config.port;
    let state = build_state(config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on http://{}", addr);
    info!("  GET  /health       - service health");
    info!("  POST /extract      - extract text (JSON: fileBase64 | fileUrl)");
    info!("  POST /extract/file - extract text (multipart upload)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("shutdown signal received");
}
