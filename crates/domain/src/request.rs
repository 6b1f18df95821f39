//! Request value objects
//!
//! An [`ApiRequest`] is what callers hand to the dispatcher: an endpoint
//! path, method, optional JSON body, and extra headers. A
//! [`PreparedRequest`] is a single attempt with the bearer token and
//! content type attached; the dispatcher builds a fresh one per attempt so
//! each retry picks up the current token.

use serde::{Deserialize, Serialize};

use crate::session::AccessToken;

/// HTTP methods used by the task backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
    /// PUT request.
    Put,
    /// PATCH request.
    Patch,
    /// DELETE request.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical API request, before authentication is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Endpoint path relative to the API base URL (e.g. `/api/u1/tasks`).
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Caller-supplied headers, merged under the auth headers.
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Creates a request with the given method and no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    /// Creates a PUT request with a JSON body.
    #[must_use]
    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(HttpMethod::Put, path).with_body(body)
    }

    /// Creates a PATCH request with no body.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a caller-supplied header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builds a single authenticated attempt against `base_url`.
    ///
    /// `Authorization` and `Content-Type` always reflect the current token
    /// and JSON payload, replacing any caller-supplied values of the same
    /// name.
    #[must_use]
    pub fn prepare(&self, base_url: &str, token: &AccessToken) -> PreparedRequest {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(name, _)| {
                !name.eq_ignore_ascii_case("authorization")
                    && !name.eq_ignore_ascii_case("content-type")
            })
            .cloned()
            .collect();
        headers.push(("Authorization".to_string(), token.authorization_header()));
        headers.push(("Content-Type".to_string(), "application/json".to_string()));

        PreparedRequest {
            url: format!("{}{}", base_url.trim_end_matches('/'), self.path),
            method: self.method,
            headers,
            body: self.body.as_ref().map(serde_json::Value::to_string),
        }
    }
}

/// One fully-assembled request attempt, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Absolute URL.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Final header set, auth headers included.
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body, if any.
    pub body: Option<String>,
}
