// ── Core error types ──
//
// Domain-level errors from ztpflow-core. Consumers never see raw HTTP
// status codes or JSON parse failures directly; the
// `From<ztpflow_api::Error>` impl translates wire-level errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input validation (caught before any network call) ───────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Every violation found in one topology load, so a single run
    /// reports every problem instead of the first.
    #[error("Topology validation failed with {} violation(s)", violations.len())]
    TopologyValidation { violations: Vec<String> },

    // ── Authentication / connectivity ────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller unavailable: {message}")]
    ControllerUnavailable { message: String },

    // ── Templates ────────────────────────────────────────────────────
    #[error("Failed to render configuration for '{device_name}': {cause}")]
    TemplateRender {
        device_name: String,
        #[source]
        cause: Box<minijinja::Error>,
    },

    #[error(
        "Template '{name}' already exists for device type '{existing}' \
         (requested '{requested}'); device type is immutable"
    )]
    TemplateConflict {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    // ── Sites / devices ──────────────────────────────────────────────
    #[error("Site not found: {path}")]
    SiteNotFound { path: String },

    #[error("No PnP device with serial number {serial}")]
    DeviceNotFound { serial: String },

    // ── Controller-side task failures ────────────────────────────────
    #[error("Controller task {task_id} failed: {reason}")]
    TaskFailed { task_id: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from wire-level errors ────────────────────────────────

impl From<ztpflow_api::Error> for CoreError {
    fn from(err: ztpflow_api::Error) -> Self {
        match err {
            ztpflow_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            ztpflow_api::Error::ControllerUnavailable {
                attempts,
                last_error,
            } => CoreError::ControllerUnavailable {
                message: format!("{last_error} (after {attempts} attempts)"),
            },
            ztpflow_api::Error::Transport(e) => CoreError::ControllerUnavailable {
                message: e.to_string(),
            },
            ztpflow_api::Error::InvalidUrl(e) => CoreError::Validation {
                message: format!("invalid URL: {e}"),
            },
            ztpflow_api::Error::Tls(message) => CoreError::ControllerUnavailable {
                message: format!("TLS error: {message}"),
            },
            ztpflow_api::Error::Api { status, body } => CoreError::Api { status, body },
            ztpflow_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
