//! Specification-driven HTTP mock server.
//!
//! A directory of `<name>.<method>.yaml` specs is compiled into an in-memory
//! routing table; requests are answered with pre-defined JSON responses chosen
//! by query parameters or request body.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod spec;

pub use config::schema::MockConfig;
pub use http::MockServer;
pub use lifecycle::Shutdown;
pub use routing::SharedRoutes;
