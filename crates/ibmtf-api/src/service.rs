// Shared executor for every service operation.
//
// `BaseService` owns the base URL, authenticator, default headers, and the
// HTTP client. Each typed client hands it a finished `ApiRequest`; it joins
// the URL, authenticates, sends, retries per the transport policy, and maps
// the response into a `DetailedResponse<T>` or an `Error`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::Authenticator;
use crate::error::Error;
use crate::request::ApiRequest;
use crate::transport::{RetryPolicy, TransportConfig};

// ── Error response shape shared by IBM Cloud platform services ──────

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorItem>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorItem {
    #[serde(default)]
    message: Option<String>,
}

// ── Response ────────────────────────────────────────────────────────

/// Status, headers, and decoded body of a successful call.
#[derive(Debug, Clone)]
pub struct DetailedResponse<T> {
    pub status: u16,
    pub headers: HeaderMap,
    pub result: T,
}

impl<T> DetailedResponse<T> {
    /// `ETag` response header, used as `If-Match` on replace.
    pub fn etag(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
    }

    pub fn into_result(self) -> T {
        self.result
    }
}

// ── Service ─────────────────────────────────────────────────────────

/// Base URL, authenticator, and HTTP client for one IBM Cloud service.
///
/// Immutable after construction; clone freely and share across tasks.
#[derive(Debug, Clone)]
pub struct BaseService {
    http: reqwest::Client,
    base_url: Url,
    authenticator: Arc<dyn Authenticator>,
    default_headers: HeaderMap,
    retry: Option<RetryPolicy>,
    timeout: Option<Duration>,
}

impl BaseService {
    /// Build from a transport config (creates its own HTTP client).
    pub fn new(
        base_url: &str,
        authenticator: Arc<dyn Authenticator>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut service = Self::with_client(base_url, http, authenticator)?;
        service.retry = transport.retry;
        service.timeout = Some(transport.timeout);
        Ok(service)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        base_url: &str,
        http: reqwest::Client,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Validation(format!(
                "service URL {base_url} cannot be used as a base"
            )));
        }
        Ok(Self {
            http,
            base_url,
            authenticator,
            default_headers: HeaderMap::new(),
            retry: None,
            timeout: None,
        })
    }

    /// Headers sent on every call, before per-call headers.
    pub fn with_default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn with_retry(mut self, retry: Option<RetryPolicy>) -> Self {
        self.retry = retry;
        self
    }

    /// The request timeout the wrapped client was built with. A client
    /// timeout is reported as `Error::Timeout` only when this is known.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builder ─────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    pub fn url_for(&self, req: &ApiRequest) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Validation(format!("service URL {} has no path", self.base_url)))?
            .pop_if_empty()
            .extend(&req.segments);
        Ok(url)
    }

    // ── Execution ───────────────────────────────────────────────────

    /// Send the request and decode the JSON body into `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        req: ApiRequest,
    ) -> Result<DetailedResponse<T>, Error> {
        let (status, headers, body) = self.send_with_retry(&req).await?;
        let result = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;
        Ok(DetailedResponse {
            status,
            headers,
            result,
        })
    }

    /// Send the request, ignoring any response body.
    pub async fn execute_empty(&self, req: ApiRequest) -> Result<DetailedResponse<()>, Error> {
        let (status, headers, _) = self.send_with_retry(&req).await?;
        Ok(DetailedResponse {
            status,
            headers,
            result: (),
        })
    }

    async fn send_with_retry(&self, req: &ApiRequest) -> Result<(u16, HeaderMap, String), Error> {
        let max_retries = self.retry.map_or(0, |p| p.max_retries);
        let mut attempt = 0;

        loop {
            match self.send_once(req).await {
                Ok(ok) => return Ok(ok),
                Err(Attempt { error, retry_after }) => {
                    let Some(policy) = self.retry else {
                        return Err(error);
                    };
                    if attempt >= max_retries || !error.is_transient() {
                        return Err(error);
                    }
                    attempt += 1;
                    let wait = retry_after
                        .unwrap_or_else(|| policy.backoff(attempt))
                        .min(policy.max_interval);
                    warn!(
                        attempt,
                        max_retries,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        "retrying {} {}: {error}",
                        req.method,
                        req.path()
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    async fn send_once(&self, req: &ApiRequest) -> Result<(u16, HeaderMap, String), Attempt> {
        let url = self.url_for(req).map_err(Attempt::from)?;
        debug!("{} {url}", req.method);

        let mut builder = self
            .http
            .request(req.method.clone(), url)
            .headers(self.default_headers.clone())
            .headers(req.headers.clone());

        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(auth) = self.authenticator.authorization().await? {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(ref body) = req.body {
            builder = builder.body(body.to_string());
        }

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            return Ok((status.as_u16(), headers, body));
        }

        Err(Attempt {
            retry_after: parse_retry_after(&headers),
            error: http_error(status, body),
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }
}

/// A failed attempt, with any server-requested delay.
struct Attempt {
    error: Error,
    retry_after: Option<Duration>,
}

impl From<Error> for Attempt {
    fn from(error: Error) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Map a non-2xx response into `Error::Http`, keeping the raw body.
pub(crate) fn http_error(status: StatusCode, body: String) -> Error {
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|env| {
            env.errors
                .into_iter()
                .find_map(|e| e.message)
                .or(env.message)
                .or(env.error)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| status.to_string(), str::to_owned)
        });

    Error::Http {
        status: status.as_u16(),
        message,
        body,
    }
}
