// Shared transport configuration for building reqwest::Client instances.
//
// Every service client (CBR, VPC, Schematics) and the IAM authenticator
// share TLS, timeout, compression, and retry settings through this module.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file
    /// (private endpoints behind an inspecting proxy).
    CustomCa(PathBuf),
    /// Accept any certificate. Only meant for local mock endpoints.
    DangerAcceptInvalid,
}

/// Retry policy applied by the shared executor.
///
/// Disabled unless a policy is set on [`TransportConfig`]. The service
/// clients never see retries; a retried call looks like a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Upper bound for a single backoff sleep.
    pub max_interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, max_interval: Duration) -> Self {
        Self {
            max_retries,
            max_interval,
        }
    }

    /// Backoff before retry number `attempt` (1-based): 1s, 2s, 4s, ... capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let secs = 1u64 << exp;
        Duration::from_secs(secs).min(self.max_interval)
    }
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
    pub gzip: bool,
    pub retry: Option<RetryPolicy>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(60),
            user_agent: format!("ibmtf/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
            retry: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .gzip(self.gzip);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Validation(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Validation(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Validation(format!("failed to build HTTP client: {e}")))
    }

    /// Enable retries with the given policy.
    pub fn with_retries(mut self, max_retries: u32, max_interval: Duration) -> Self {
        self.retry = Some(RetryPolicy::new(max_retries, max_interval));
        self
    }
}
