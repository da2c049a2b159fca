//! Routing table storage and publication.
//!
//! # Responsibilities
//! - Store compiled routes keyed by (method, path)
//! - Answer "which methods exist for this path" for 404/405 decisions
//! - Publish whole new tables to concurrent readers
//!
//! # Design Decisions
//! - A `RoutingTable` is never mutated after construction
//! - Readers hold an `Arc<RoutingTable>` for one request; a reload swaps the
//!   pointer, so an in-flight request keeps its generation
//! - Single writer (startup, then the reload watcher), many readers, no locks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use axum::http::Method;

use crate::routing::route::{RouteEntry, RouteKey};

/// Immutable mapping from `RouteKey` to `RouteEntry`.
#[derive(Debug, Default)]
pub struct RoutingTable {
    routes: HashMap<RouteKey, RouteEntry>,
    /// path -> methods defined for it, sorted.
    methods_by_path: HashMap<String, Vec<Method>>,
    generation: u64,
}

impl RoutingTable {
    pub fn new(routes: HashMap<RouteKey, RouteEntry>) -> Self {
        let mut methods_by_path: HashMap<String, Vec<Method>> = HashMap::new();
        for key in routes.keys() {
            methods_by_path
                .entry(key.path.clone())
                .or_default()
                .push(key.method.clone());
        }
        for methods in methods_by_path.values_mut() {
            methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        }

        Self {
            routes,
            methods_by_path,
            generation: 0,
        }
    }

    pub fn get(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        // Borrowed lookups need an owned key; paths are short.
        self.routes.get(&RouteKey::new(method.clone(), path))
    }

    /// Methods defined for `path` under any spec, or `None` if the path is unknown.
    pub fn allowed_methods(&self, path: &str) -> Option<&[Method]> {
        self.methods_by_path.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Generation assigned on publication; 0 for a table never published.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Routes ordered by path, then method.
    pub fn routes(&self) -> Vec<(&RouteKey, &RouteEntry)> {
        let mut routes: Vec<_> = self.routes.iter().collect();
        routes.sort_by(|(a, _), (b, _)| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.method.as_str().cmp(b.method.as_str()))
        });
        routes
    }
}

/// Handle to the live routing table, cloned into every request handler.
#[derive(Debug, Clone)]
pub struct SharedRoutes {
    current: Arc<ArcSwap<RoutingTable>>,
    next_generation: Arc<AtomicU64>,
}

impl SharedRoutes {
    /// Wrap the startup table as generation 1.
    pub fn new(table: RoutingTable) -> Self {
        let shared = Self {
            current: Arc::new(ArcSwap::from_pointee(RoutingTable::default())),
            next_generation: Arc::new(AtomicU64::new(1)),
        };
        shared.publish(table);
        shared
    }

    /// Snapshot of the current generation. Hold it for one request.
    pub fn current(&self) -> Arc<RoutingTable> {
        self.current.load_full()
    }

    /// Replace the live table wholesale. Returns the generation assigned.
    pub fn publish(&self, mut table: RoutingTable) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        table.generation = generation;
        self.current.store(Arc::new(table));
        generation
    }
}
