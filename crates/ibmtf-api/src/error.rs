use thiserror::Error;

/// Top-level error type for the `ibmtf-api` crate.
///
/// Covers every failure mode of the service clients: local validation,
/// authentication, transport, HTTP status, and payload decoding.
/// `ibmtf-core` maps these into provider diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Validation ──────────────────────────────────────────────────
    /// A required path, query, or header parameter was empty.
    #[error("{name} must be provided")]
    MissingParameter { name: &'static str },

    /// The request could not be assembled (unresolved path template, bad header, etc.)
    #[error("Invalid request: {0}")]
    Validation(String),

    // ── Authentication ──────────────────────────────────────────────
    /// Token exchange failed or the authenticator was misconfigured.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-2xx response. `body` is the raw response body, kept verbatim.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A polymorphic payload lacked its discriminator field.
    #[error("required discriminator property \"{property}\" not found")]
    MissingDiscriminator { property: &'static str },

    /// A polymorphic payload named a variant this client does not know.
    #[error("unrecognized value for discriminator property \"{property}\": {value}")]
    UnrecognizedDiscriminator {
        property: &'static str,
        value: String,
    },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body, if the error carries one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } | Self::Deserialization { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> Error {
        Error::Http {
            status,
            message: String::new(),
            body: String::new(),
        }
    }

    #[test]
    fn throttling_and_server_errors_are_transient() {
        assert!(http(429).is_transient());
        assert!(http(503).is_transient());
        assert!(!http(400).is_transient());
        assert!(!http(404).is_transient());
    }

    #[test]
    fn not_found_only_for_404() {
        assert!(http(404).is_not_found());
        assert!(!http(410).is_not_found());
        assert!(!Error::MissingParameter { name: "zone_id" }.is_not_found());
    }

    #[test]
    fn discriminator_messages() {
        let missing = Error::MissingDiscriminator { property: "type" };
        assert_eq!(
            missing.to_string(),
            "required discriminator property \"type\" not found"
        );
        let unknown = Error::UnrecognizedDiscriminator {
            property: "type",
            value: "ipv6Address".into(),
        };
        assert_eq!(
            unknown.to_string(),
            "unrecognized value for discriminator property \"type\": ipv6Address"
        );
    }
}
