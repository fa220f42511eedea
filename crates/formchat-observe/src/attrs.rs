//! Span names and tracing targets shared across FormChat crates.
//!
//! All constants are string slices usable as span names and `target:` values
//! in `tracing` macros, and as `EnvFilter` directives.

/// Service name reported to OpenTelemetry.
pub const SERVICE_NAME: &str = "formchat";

// --- Targets ---

/// Diagnostics from the widget loader running on host pages.
pub const TARGET_WIDGET: &str = "formchat::widget";

/// HTTP request handling.
pub const TARGET_HTTP: &str = "formchat::http";

// --- Span names ---

/// One HTTP request through the REST API.
pub const SPAN_HTTP_REQUEST: &str = "http_request";

/// Compiling a chatbot's embed artifacts.
pub const SPAN_EMBED_COMPILE: &str = "embed_compile";

/// Recording one usage event.
pub const SPAN_USAGE_RECORD: &str = "usage_record";
