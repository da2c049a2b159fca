//! Compiled route definitions.
//!
//! These are the frozen, load-time products of a spec file. Nothing here
//! touches the filesystem; see `spec::loader` for how they are built.

use std::collections::BTreeMap;
use std::fmt;

use axum::http::{Method, StatusCode};
use serde_json::Value;

/// Unique key of a route: uppercase method plus normalized URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: Method,
    pub path: String,
}

impl RouteKey {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Condition attached to a single match rule.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchCondition {
    /// Every listed query parameter must be present with exactly this value.
    Query(BTreeMap<String, String>),
    /// The request body, parsed as JSON, must deep-equal this value.
    Body(Value),
    /// Neither `params` nor a request payload was given; never satisfied.
    Never,
}

impl MatchCondition {
    /// `params` takes precedence over a request payload.
    pub fn from_parts(params: Option<BTreeMap<String, String>>, request: Option<Value>) -> Self {
        match (params, request) {
            (Some(params), _) => MatchCondition::Query(params),
            (None, Some(body)) => MatchCondition::Body(body),
            (None, None) => MatchCondition::Never,
        }
    }
}

/// One conditional rule within a route.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchEntry {
    pub condition: MatchCondition,
    pub status: StatusCode,
    pub response: Option<Value>,
}

/// Everything needed to answer requests for one `RouteKey`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    /// Fallback status when no rule applies.
    pub status: StatusCode,
    /// Fallback payload when no rule applies.
    pub default_response: Option<Value>,
    /// Rules in declaration order; the first satisfied one wins.
    pub matches: Vec<MatchEntry>,
}

impl Default for RouteEntry {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            default_response: None,
            matches: Vec::new(),
        }
    }
}
