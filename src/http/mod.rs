//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all dispatch)
//!     → request.rs (lazy, bounded body read)
//!     → routing::matcher (pick status + payload)
//!     → response.rs (JSON rendering, Allow on 405)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use server::{AppState, MockServer};
