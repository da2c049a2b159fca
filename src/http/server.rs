//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Dispatch requests to the match engine against the live routing table
//! - Serve until the shutdown signal fires

use std::io;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::MockConfig;
use crate::http::request::read_body;
use crate::observability::metrics;
use crate::routing::matcher::{match_request, parse_query};
use crate::routing::SharedRoutes;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: SharedRoutes,
    pub max_body_bytes: usize,
}

/// HTTP server answering from the spec routing table.
pub struct MockServer {
    router: Router,
    config: MockConfig,
}

impl MockServer {
    /// Create a server reading routes from `routes`.
    pub fn new(config: MockConfig, routes: SharedRoutes) -> Self {
        let state = AppState {
            routes,
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &MockConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.limits.request_timeout_secs)));

        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(middleware)
    }

    /// The configured router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            spec_dir = %self.config.specs.dir.display(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler.
///
/// Takes one snapshot of the routing table so the whole request is answered
/// from a single generation, even if a reload lands mid-request. If the
/// client disconnects, hyper drops this future and nothing else is affected.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let table = state.routes.current();

    let (parts, body) = request.into_parts();
    let query = parse_query(parts.uri.query());
    let limit = state.max_body_bytes;

    let mock = match_request(&table, &parts.method, parts.uri.path(), &query, move || {
        read_body(body, limit)
    })
    .await;

    tracing::info!(
        method = %parts.method,
        path = %parts.uri.path(),
        status = mock.status.as_u16(),
        source = %mock.source,
        generation = table.generation(),
        "Request served"
    );
    metrics::record_request(parts.method.as_str(), mock.status.as_u16(), mock.source.label(), start_time);

    mock.into_response()
}
