// Authenticators for IBM Cloud services.
//
// Every service call asks its authenticator for an `Authorization` header
// value right before sending. The IAM authenticator exchanges an API key
// for a bearer token and caches it until most of its lifetime has elapsed.

use std::fmt;
use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::header::{ACCEPT, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Default IAM token endpoint.
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Produces the `Authorization` header for outbound requests.
///
/// Returning `Ok(None)` sends the request unauthenticated.
pub trait Authenticator: Send + Sync + fmt::Debug {
    fn authorization(&self) -> BoxFuture<'_, Result<Option<HeaderValue>, Error>>;
}

/// Sends no credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl Authenticator for NoAuth {
    fn authorization(&self) -> BoxFuture<'_, Result<Option<HeaderValue>, Error>> {
        Box::pin(async { Ok(None) })
    }
}

/// A static, caller-managed bearer token.
#[derive(Debug, Clone)]
pub struct BearerToken {
    token: SecretString,
}

impl BearerToken {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

impl Authenticator for BearerToken {
    fn authorization(&self) -> BoxFuture<'_, Result<Option<HeaderValue>, Error>> {
        Box::pin(async move { bearer_header(self.token.expose_secret()).map(Some) })
    }
}

fn bearer_header(token: &str) -> Result<HeaderValue, Error> {
    let mut value =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| Error::Authentication {
            message: format!("invalid token header value: {e}"),
        })?;
    value.set_sensitive(true);
    Ok(value)
}

// ── IAM ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct IamErrorResponse {
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
    #[serde(default, rename = "errorCode")]
    error_code: Option<String>,
}

struct CachedToken {
    header: HeaderValue,
    refresh_at: Instant,
}

/// Exchanges an IBM Cloud API key for an IAM access token.
///
/// The token is cached and reused until 80% of its `expires_in` lifetime
/// has passed; the next call after that fetches a fresh one.
pub struct IamAuthenticator {
    http: reqwest::Client,
    api_key: SecretString,
    token_url: Url,
    cached: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for IamAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamAuthenticator")
            .field("token_url", &self.token_url.as_str())
            .finish_non_exhaustive()
    }
}

impl IamAuthenticator {
    pub fn new(http: reqwest::Client, api_key: SecretString, token_url: Url) -> Self {
        Self {
            http,
            api_key,
            token_url,
            cached: Mutex::new(None),
        }
    }

    /// Build against the public IAM endpoint.
    pub fn with_default_url(http: reqwest::Client, api_key: SecretString) -> Result<Self, Error> {
        Ok(Self::new(http, api_key, Url::parse(DEFAULT_IAM_URL)?))
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    async fn request_token(&self) -> Result<CachedToken, Error> {
        debug!("requesting IAM token from {}", self.token_url);

        let resp = self
            .http
            .post(self.token_url.clone())
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", APIKEY_GRANT_TYPE),
                ("apikey", self.api_key.expose_secret()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<IamErrorResponse>(&body)
                .ok()
                .and_then(|e| match (e.error_code, e.error_message) {
                    (Some(code), Some(msg)) => Some(format!("{code}: {msg}")),
                    (None, Some(msg)) => Some(msg),
                    _ => None,
                })
                .unwrap_or_else(|| format!("IAM token request failed (HTTP {status})"));
            return Err(Error::Authentication { message });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Authentication {
                message: format!("malformed IAM token response: {e}"),
            })?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        let refresh_at = Instant::now() + lifetime.mul_f64(0.8);

        Ok(CachedToken {
            header: bearer_header(&token.access_token)?,
            refresh_at,
        })
    }
}

impl Authenticator for IamAuthenticator {
    fn authorization(&self) -> BoxFuture<'_, Result<Option<HeaderValue>, Error>> {
        Box::pin(async move {
            let mut cached = self.cached.lock().await;

            if let Some(ref token) = *cached {
                if Instant::now() < token.refresh_at {
                    return Ok(Some(token.header.clone()));
                }
                debug!("IAM token nearing expiry, refreshing");
            }

            let fresh = self.request_token().await?;
            let header = fresh.header.clone();
            *cached = Some(fresh);
            Ok(Some(header))
        })
    }
}
