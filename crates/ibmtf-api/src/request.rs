// Request building for every service operation.
//
// A `RequestBuilder` turns a path template plus optional/required inputs into
// a finished `ApiRequest`. Building never touches the network: any missing
// required input fails here, before a request exists.

use std::collections::BTreeMap;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;

pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";
pub const TRANSACTION_ID_HEADER: &str = "Transaction-Id";
pub const IF_MATCH_HEADER: &str = "If-Match";

/// Per-call headers every options struct carries.
///
/// `extra` is applied last, so it overrides anything the builder set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallHeaders {
    pub correlation_id: Option<String>,
    pub transaction_id: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl CallHeaders {
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// A fully assembled request, ready for the executor.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments, unencoded. The executor percent-encodes them onto the base URL.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// The resolved path, for logging and tests.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// First value of a query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for a single operation's HTTP request.
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    template: &'static str,
    path_params: Vec<(&'static str, String)>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    call_headers: CallHeaders,
    body: Option<Value>,
}

impl RequestBuilder {
    pub fn new(method: Method, template: &'static str) -> Self {
        Self {
            method,
            template,
            path_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            call_headers: CallHeaders::default(),
            body: None,
        }
    }

    // ── Path ────────────────────────────────────────────────────────

    /// Bind a `{name}` placeholder. Empty values are rejected.
    pub fn path_param(mut self, name: &'static str, value: &str) -> Result<Self, Error> {
        if value.is_empty() {
            return Err(Error::MissingParameter { name });
        }
        self.path_params.push((name, value.to_owned()));
        Ok(self)
    }

    // ── Query ───────────────────────────────────────────────────────

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_owned(), value.to_string()));
        self
    }

    /// Add a query parameter only when the value is present.
    pub fn query_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(name, v),
            None => self,
        }
    }

    /// Add a query parameter that must be non-empty.
    pub fn required_query(self, name: &'static str, value: &str) -> Result<Self, Error> {
        if value.is_empty() {
            return Err(Error::MissingParameter { name });
        }
        Ok(self.query(name, value))
    }

    // ── Headers ─────────────────────────────────────────────────────

    /// Add a header that must be non-empty (e.g. `If-Match` on replace).
    pub fn required_header(mut self, name: &'static str, value: &str) -> Result<Self, Error> {
        if value.is_empty() {
            return Err(Error::MissingParameter { name });
        }
        self.headers.push((name.to_owned(), value.to_owned()));
        Ok(self)
    }

    pub fn call_headers(mut self, headers: &CallHeaders) -> Self {
        self.call_headers = headers.clone();
        self
    }

    // ── Body ────────────────────────────────────────────────────────

    /// Serialize `body` as JSON, dropping every `null` member.
    pub fn json_body<B: Serialize>(mut self, body: &B) -> Result<Self, Error> {
        let mut value = serde_json::to_value(body)
            .map_err(|e| Error::Validation(format!("failed to serialize request body: {e}")))?;
        strip_nulls(&mut value);
        self.body = Some(value);
        Ok(self)
    }

    // ── Finish ──────────────────────────────────────────────────────

    pub fn build(self) -> Result<ApiRequest, Error> {
        let segments = self.resolve_segments()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if self.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(ref id) = self.call_headers.correlation_id {
            insert_header(&mut headers, CORRELATION_ID_HEADER, id)?;
        }
        if let Some(ref id) = self.call_headers.transaction_id {
            insert_header(&mut headers, TRANSACTION_ID_HEADER, id)?;
        }
        for (name, value) in &self.headers {
            insert_header(&mut headers, name, value)?;
        }
        for (name, value) in &self.call_headers.extra {
            insert_header(&mut headers, name, value)?;
        }

        Ok(ApiRequest {
            method: self.method,
            segments,
            query: self.query,
            headers,
            body: self.body,
        })
    }

    fn resolve_segments(&self) -> Result<Vec<String>, Error> {
        self.template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                let Some(name) = segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                else {
                    return Ok(segment.to_owned());
                };
                self.path_params
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| {
                        Error::Validation(format!(
                            "path parameter {{{name}}} in {} was not bound",
                            self.template
                        ))
                    })
            })
            .collect()
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), Error> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::Validation(format!("invalid header name {name:?}: {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| Error::Validation(format!("invalid value for header {name}: {e}")))?;
    headers.insert(name, value);
    Ok(())
}

/// Remove `null` members from every object in the tree.
pub(crate) fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}
