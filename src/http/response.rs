//! Response rendering.
//!
//! # Responsibilities
//! - Render a `MockResponse` as an HTTP response
//! - Always `Content-Type: application/json`
//! - Omit the body entirely when the payload is absent
//! - Add `Allow` on 405

use axum::body::Body;
use axum::http::header::{ALLOW, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::MockResponse;

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let body = match &self.body {
            Some(value) => match serde_json::to_vec(value) {
                Ok(bytes) => Body::from(bytes),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize response payload");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            },
            None => Body::empty(),
        };

        let mut response = (self.status, [(CONTENT_TYPE, HeaderValue::from_static("application/json"))], body).into_response();

        if !self.allow.is_empty() {
            let allow = self
                .allow
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(ALLOW, value);
            }
        }
        response
    }
}
