//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ztpflow_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    /// A provisioning run finished but one or more devices failed.
    pub const PARTIAL: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the controller")]
    #[diagnostic(
        code(ztpflow::connection_failed),
        help(
            "Check that the controller is running and accessible.\n\
             Detail: {detail}\n\
             Try: ztpflow devices --insecure"
        )
    )]
    ConnectionFailed { detail: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(ztpflow::auth_failed),
        help(
            "Verify the username and password for profile '{profile}'.\n\
             Set ZTP_PASSWORD or configure the profile's password_env."
        )
    )]
    AuthFailed { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(ztpflow::no_credentials),
        help(
            "Add a username to the profile and set ZTP_PASSWORD,\n\
             or store a password in the system keyring."
        )
    )]
    NoCredentials { profile: String },

    // ── Topology / validation ────────────────────────────────────────
    #[error("Topology validation failed with {} violation(s)", violations.len())]
    #[diagnostic(
        code(ztpflow::topology_invalid),
        help("Fix the violations listed above and re-run: ztpflow validate <topology>")
    )]
    TopologyInvalid { violations: Vec<String> },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ztpflow::validation))]
    Validation { field: String, reason: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(ztpflow::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("Template '{name}' conflicts with an existing one")]
    #[diagnostic(
        code(ztpflow::template_conflict),
        help("The template's device type is immutable; rename the template or match '{existing}'.")
    )]
    TemplateConflict { name: String, existing: String },

    // ── Rendering ────────────────────────────────────────────────────
    #[error("Rendering failed for '{device}'")]
    #[diagnostic(code(ztpflow::render), help("{detail}"))]
    Render { device: String, detail: String },

    // ── API / tasks ──────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(ztpflow::api_error))]
    ApiError { status: u16, message: String },

    #[error("Controller task {task_id} failed: {reason}")]
    #[diagnostic(code(ztpflow::task_failed))]
    TaskFailed { task_id: String, reason: String },

    // ── Partial provisioning ─────────────────────────────────────────
    #[error("{failed} of {total} device(s) failed to provision")]
    #[diagnostic(
        code(ztpflow::partial),
        help("See the run summary above, or re-run with --report <file> for details.")
    )]
    PartialFailure { failed: usize, total: usize },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(code(ztpflow::profile_not_found), help("Expected config at: {path}"))]
    ProfileNotFound { name: String, path: String },

    #[error(transparent)]
    #[diagnostic(code(ztpflow::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(ztpflow::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::TemplateConflict { .. } => exit_code::CONFLICT,
            Self::TopologyInvalid { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::TaskFailed { .. } => exit_code::TIMEOUT,
            Self::PartialFailure { .. } => exit_code::PARTIAL,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::TopologyValidation { violations } => {
                CliError::TopologyInvalid { violations }
            }

            CoreError::AuthenticationFailed { message: _ } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::ControllerUnavailable { message } => {
                CliError::ConnectionFailed { detail: message }
            }

            CoreError::TemplateRender { device_name, cause } => CliError::Render {
                device: device_name,
                detail: cause.to_string(),
            },

            CoreError::TemplateConflict { name, existing, requested: _ } => {
                CliError::TemplateConflict { name, existing }
            }

            CoreError::TemplateNotFound { name } => CliError::NotFound {
                resource_type: "template".into(),
                identifier: name,
            },

            CoreError::SiteNotFound { path } => CliError::NotFound {
                resource_type: "site".into(),
                identifier: path,
            },

            CoreError::DeviceNotFound { serial } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: serial,
            },

            CoreError::TaskFailed { task_id, reason } => {
                CliError::TaskFailed { task_id, reason }
            }

            CoreError::Api { status, body } => CliError::ApiError {
                status,
                message: body,
            },

            CoreError::Io(e) => CliError::Io(e),

            CoreError::Internal(message) => CliError::ApiError {
                status: 0,
                message,
            },
        }
    }
}

impl From<ztpflow_config::ConfigError> for CliError {
    fn from(err: ztpflow_config::ConfigError) -> Self {
        match err {
            ztpflow_config::ConfigError::NoCredentials { profile } => {
                CliError::NoCredentials { profile }
            }
            ztpflow_config::ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                path: ztpflow_config::config_path().display().to_string(),
            },
            ztpflow_config::ConfigError::Validation { field, reason } => {
                CliError::Validation { field, reason }
            }
            ztpflow_config::ConfigError::Figment(e) => CliError::Config(e),
            ztpflow_config::ConfigError::Io(e) => CliError::Io(e),
            ztpflow_config::ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
        }
    }
}
