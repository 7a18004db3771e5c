// ── Runtime provider configuration ──
//
// Describes how to reach IBM Cloud: credentials, region, endpoint overrides
// and transport tuning. Core never reads config files; the CLI builds a
// `ProviderConfig` from a profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;

pub const DEFAULT_REGION: &str = "us-south";
pub const DEFAULT_CONSOLE_URL: &str = "https://cloud.ibm.com";

/// How service calls are authenticated.
#[derive(Debug, Clone, Default)]
pub enum Credentials {
    /// IBM Cloud API key, exchanged for IAM tokens.
    ApiKey(SecretString),
    /// A pre-issued IAM access token.
    BearerToken(SecretString),
    /// No `Authorization` header (local mock endpoints).
    #[default]
    None,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub credentials: Credentials,
    pub region: String,
    /// IAM token endpoint; the public one when unset.
    pub iam_url: Option<String>,
    pub cbr_endpoint: Option<String>,
    /// VPC endpoint; derived from `region` when unset.
    pub vpc_endpoint: Option<String>,
    pub schematics_endpoint: Option<String>,
    /// IBM Cloud console base URL, used for dashboard links.
    pub console_url: String,
    pub timeout: Duration,
    /// Retries for transient failures. 0 disables retrying.
    pub max_retries: u32,
    pub max_retry_interval: Duration,
    pub user_agent: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::None,
            region: DEFAULT_REGION.into(),
            iam_url: None,
            cbr_endpoint: None,
            vpc_endpoint: None,
            schematics_endpoint: None,
            console_url: DEFAULT_CONSOLE_URL.into(),
            timeout: Duration::from_secs(60),
            max_retries: 0,
            max_retry_interval: Duration::from_secs(30),
            user_agent: None,
        }
    }
}
