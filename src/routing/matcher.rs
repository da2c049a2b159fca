//! Request matching against a routing table.
//!
//! # Responsibilities
//! - Normalize the request path and decode the query string
//! - Pick 404 / 405 / a route entry for (method, path)
//! - Evaluate match rules in declaration order, first satisfied wins
//! - Fall back to the route's default status and payload
//!
//! # Design Decisions
//! - The body is read lazily, at most once, and only when a body rule is
//!   reached; query-only routes never touch the request stream
//! - An empty, unreadable or non-JSON body is "no body", never an error
//! - Multi-valued query parameters compare by their first occurrence

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use crate::routing::route::{MatchCondition, RouteEntry};
use crate::routing::table::RoutingTable;

/// Decoded query parameters, first occurrence of each key.
pub type QueryParams = HashMap<String, String>;

/// Decode a raw query string. Later duplicates of a key are ignored.
pub fn parse_query(query: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    params
}

/// Strip trailing slashes; the root path stays `/`.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Where a response came from, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// 1-based ordinal of the satisfied match rule.
    Rule(usize),
    Default,
    NotFound,
    MethodNotAllowed,
}

impl ResponseSource {
    pub fn label(&self) -> &'static str {
        match self {
            ResponseSource::Rule(_) => "rule",
            ResponseSource::Default => "default",
            ResponseSource::NotFound => "not_found",
            ResponseSource::MethodNotAllowed => "method_not_allowed",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Rule(i) => write!(f, "rule #{}", i),
            other => f.write_str(other.label()),
        }
    }
}

/// Outcome of matching one request.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: StatusCode,
    /// `None` means the response has no body.
    pub body: Option<Value>,
    /// Methods defined for the path; only set on 405.
    pub allow: Vec<Method>,
    pub source: ResponseSource,
}

impl MockResponse {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: Some(json!({"error": "Not Found"})),
            allow: Vec::new(),
            source: ResponseSource::NotFound,
        }
    }

    fn method_not_allowed(allow: &[Method]) -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            body: Some(json!({"error": "Method Not Allowed"})),
            allow: allow.to_vec(),
            source: ResponseSource::MethodNotAllowed,
        }
    }
}

/// Request body that is fetched on first use and parsed once.
struct LazyBody<F> {
    source: Option<F>,
    parsed: Option<Value>,
}

impl<F, Fut> LazyBody<F>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<Bytes>>,
{
    fn new(source: F) -> Self {
        Self {
            source: Some(source),
            parsed: None,
        }
    }

    async fn json(&mut self) -> Option<&Value> {
        if let Some(source) = self.source.take() {
            self.parsed = source().await.and_then(|bytes| parse_body(&bytes));
        }
        self.parsed.as_ref()
    }
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not JSON, treating as absent");
            None
        }
    }
}

/// Select the response for a request.
///
/// `body` is invoked at most once, and only if a body-equality rule is
/// evaluated. It yields `None` when the body could not be read.
pub async fn match_request<F, Fut>(
    table: &RoutingTable,
    method: &Method,
    path: &str,
    query: &QueryParams,
    body: F,
) -> MockResponse
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<Bytes>>,
{
    let path = normalize_path(path);

    let route = match table.get(method, path) {
        Some(route) => route,
        None => {
            return match table.allowed_methods(path) {
                Some(allow) => MockResponse::method_not_allowed(allow),
                None => MockResponse::not_found(),
            };
        }
    };

    let mut body = LazyBody::new(body);
    for (i, rule) in route.matches.iter().enumerate() {
        let satisfied = match &rule.condition {
            MatchCondition::Query(expected) => query_matches(expected.iter(), query),
            MatchCondition::Body(expected) => body.json().await == Some(expected),
            MatchCondition::Never => false,
        };
        if satisfied {
            return MockResponse {
                status: rule.status,
                body: rule.response.clone(),
                allow: Vec::new(),
                source: ResponseSource::Rule(i + 1),
            };
        }
    }

    default_response(route)
}

fn query_matches<'a>(
    mut expected: impl Iterator<Item = (&'a String, &'a String)>,
    query: &QueryParams,
) -> bool {
    expected.all(|(key, value)| query.get(key) == Some(value))
}

fn default_response(route: &RouteEntry) -> MockResponse {
    MockResponse {
        status: route.status,
        body: route.default_response.clone(),
        allow: Vec::new(),
        source: ResponseSource::Default,
    }
}
