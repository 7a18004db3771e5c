// ── Core error types ──
//
// Errors surfaced by data sources and resources. Transport-level failures
// from `ibmtf_api` are translated into these variants; the raw response body
// is kept on `Api` and `Decode` so the host can show it as diagnostic detail.

use serde::Serialize;
use thiserror::Error;

/// Unified error type for the adapter layer.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup ───────────────────────────────────────────────────────
    /// A name scan over a listing found nothing.
    #[error("{entity_type} {name} not found.")]
    NotFound {
        entity_type: &'static str,
        name: String,
    },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// A handler tried to set an attribute its schema does not declare.
    #[error("Unknown attribute: {name}")]
    UnknownAttribute { name: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
        /// Raw response body, verbatim.
        body: Option<String>,
    },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Decode error: {message}")]
    Decode { message: String, body: Option<String> },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Convert an API error, prefixing its message with the failed operation.
    ///
    /// Only message-bearing variants are prefixed; auth, connection and
    /// timeout failures read the same regardless of which call hit them.
    pub fn api_context(context: &str, err: ibmtf_api::Error) -> Self {
        match Self::from(err) {
            Self::Api {
                message,
                status,
                body,
            } => Self::Api {
                message: format!("{context}: {message}"),
                status,
                body,
            },
            Self::Decode { message, body } => Self::Decode {
                message: format!("{context}: {message}"),
                body,
            },
            other => other,
        }
    }

    /// HTTP status, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Raw response body attached to the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } | Self::Decode { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string(), self.body().map(str::to_owned))
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ibmtf_api::Error> for CoreError {
    fn from(err: ibmtf_api::Error) -> Self {
        use ibmtf_api::Error as E;

        match err {
            E::MissingParameter { name } => CoreError::ValidationFailed {
                message: format!("{name} must be provided"),
            },
            E::Validation(message) => CoreError::ValidationFailed { message },
            E::Authentication { message } => CoreError::Authentication { message },
            E::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                        body: None,
                    }
                }
            }
            E::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            E::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            E::Http {
                status,
                message,
                body,
            } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
                body: Some(body),
            },
            E::Deserialization { message, body } => CoreError::Decode {
                message,
                body: Some(body),
            },
            e @ (E::MissingDiscriminator { .. } | E::UnrecognizedDiscriminator { .. }) => {
                CoreError::Decode {
                    message: e.to_string(),
                    body: None,
                }
            }
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Internal(format!("JSON encoding failed: {err}"))
    }
}

// ── Diagnostics ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One host-facing message: a one-line summary plus optional detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail,
        }
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: None,
        }
    }
}

/// Accumulates diagnostics so validation can report every problem at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.0.push(diag);
    }

    pub fn error(&mut self, summary: impl Into<String>) {
        self.push(Diagnostic::error(summary, None));
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// `Ok` when no errors were recorded, else one `ValidationFailed`
    /// joining every error summary.
    pub fn into_result(self) -> Result<(), CoreError> {
        if !self.has_errors() {
            return Ok(());
        }
        let message = self
            .0
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.summary)
            .collect::<Vec<_>>()
            .join("; ");
        Err(CoreError::ValidationFailed { message })
    }
}
