//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → cli.rs overrides (--port, --dir, --reload, ...)
//!     → validation.rs (semantic checks)
//!     → MockConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; running with no file and no flags is valid
//!   as long as `./api` exists
//! - Validation separates syntactic (serde) from semantic checks
//! - Server config is loaded once; only the spec tree hot-reloads

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{read_config, validated, ConfigError};
pub use schema::{LimitsConfig, ListenerConfig, LogFormat, MockConfig, ObservabilityConfig, SpecsConfig};
pub use validation::{validate_config, ValidationError};
