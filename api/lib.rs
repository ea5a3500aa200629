pub mod errors;
pub(crate) mod extractors;
mod handlers;
mod logging;
pub mod mem;
pub mod pagination;
pub mod service;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::MatchedPath;
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use logging::{trace_request_response, ApiMakeSpan};
use metrics::{histogram, increment_counter};
use roster_lib::consts::REQUEST_ID_HEADER;
use roster_lib::{netutils, Config, RequestId};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use crate::service::{
    AccountsService,
    OrganizationsService,
    Reply,
    ServiceError,
};

/// Everything the handlers need, shared behind an `Arc`.
///
/// The two service fields are trait objects so that tests and the dev
/// server can swap backends without touching routing.
pub struct AppState {
    pub config: Config,
    pub accounts: Box<dyn AccountsService>,
    pub organizations: Box<dyn OrganizationsService>,
}

impl AppState {
    pub fn new(
        config: Config,
        accounts: Box<dyn AccountsService>,
        organizations: Box<dyn OrganizationsService>,
    ) -> Self {
        Self {
            config,
            accounts,
            organizations,
        }
    }

    /// A state wired to the in-memory backend.
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            config,
            Box::<mem::MemAccounts>::default(),
            Box::<mem::MemOrganizations>::default(),
        )
    }
}

async fn fallback() -> impl IntoResponse {
    errors::envelope_response(StatusCode::NOT_FOUND, "Not Found".to_owned())
}

/// Builds the full application router around the given state.
///
/// Kept separate from [`start_api_server`] so that tests can drive the
/// router directly without binding a socket.
pub fn router(shared_state: Arc<AppState>) -> Router {
    let config = Arc::new(shared_state.config.clone());
    Router::new()
        // `GET /` goes to `root`
        .route("/", get(root))
        .nest("/v1", handlers::routes(shared_state))
        .layer(middleware::from_fn_with_state(
            config,
            trace_request_response,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(ApiMakeSpan::new("roster-api".to_owned())),
        )
        .route_layer(middleware::from_fn(inject_request_id))
        .route_layer(middleware::from_fn(track_metrics))
        .fallback(fallback)
}

#[tracing::instrument(skip_all)]
pub async fn start_api_server(
    state: AppState,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let addr =
        netutils::parse_addr(&state.config.api.address, state.config.api.port)?;

    let app = router(Arc::new(state));

    info!("Starting the roster API server on {addr:?}");
    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

// basic handler that responds with a static string
async fn root() -> &'static str {
    "Hey, better visit https://roster.dev"
}

async fn inject_request_id<B>(
    mut req: Request<B>,
    next: Next<B>,
) -> impl IntoResponse {
    let request_id = RequestId::new();
    // Inject RequestId into extensions. Can be useful if someone wants to
    // log the request_id
    req.extensions_mut().insert(request_id.clone());
    // Run the next layer
    let mut response = next.run(req).await;
    // Inject request_id into response headers
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER, request_id.to_string().parse().unwrap());
    response
}

async fn track_metrics<B>(req: Request<B>, next: Next<B>) -> impl IntoResponse {
    let start = Instant::now();
    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>()
    {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };
    let method = req.method().clone();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    increment_counter!("roster.api.http_requests_total", &labels);
    histogram!(
        "roster.api.http_requests_duration_seconds",
        latency,
        &labels
    );

    response
}
