//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query, body)
//!     → table.rs (current generation, (method, path) lookup)
//!     → matcher.rs (404 / 405 / ordered match rules / default)
//!     → Return: MockResponse
//!
//! Route Compilation (startup and every reload):
//!     spec directory
//!     → spec::loader (RouteKey → RouteEntry)
//!     → RoutingTable (frozen)
//!     → SharedRoutes::publish (atomic swap)
//! ```
//!
//! # Design Decisions
//! - Tables are immutable; reload replaces, never mutates
//! - Deterministic: same spec tree always yields the same table
//! - First satisfied match rule wins (declaration order)

pub mod matcher;
pub mod route;
pub mod table;

pub use matcher::{match_request, MockResponse, QueryParams, ResponseSource};
pub use route::{MatchCondition, MatchEntry, RouteEntry, RouteKey};
pub use table::{RoutingTable, SharedRoutes};
