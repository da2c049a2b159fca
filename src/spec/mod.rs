//! Spec subsystem: from a directory of YAML specs to a routing table.
//!
//! # Data Flow
//! ```text
//! spec root
//!     → loader.rs (walk *.yaml sorted, filename → RouteKey)
//!     → document.rs (parse YAML mapping)
//!     → resolver.rs (inline → *_file → convention file)
//!     → RoutingTable
//!
//! With --reload:
//!     watcher.rs polls mtimes of *.yaml / *.json
//!     → change detected → loader.rs full reload
//!     → SharedRoutes::publish on success, keep current table on error
//! ```
//!
//! # Design Decisions
//! - Directory structure is the URL namespace; the method lives in the filename
//! - Reloads are all-or-nothing; a partial table is never published
//! - No debounce: every detected change reloads the whole tree

pub mod document;
pub mod loader;
pub mod resolver;
pub mod watcher;

pub use loader::{load_specs, load_table, SpecLoadError};
pub use watcher::{PollOutcome, ReloadWatcher};
