//! Request body access for the match engine.
//!
//! # Responsibilities
//! - Read the request body at most once, bounded by the configured limit
//! - Turn read failures (client gone, body too large) into "no body"
//!
//! # Design Decisions
//! - The body is only read if the matcher asks for it, so requests that
//!   match on query parameters alone never consume the stream

use axum::body::{Body, Bytes};

/// Collect the body, or `None` if it cannot be read within `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Option<Bytes> {
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!(error = %e, limit, "Request body unreadable, matching as absent");
            None
        }
    }
}
