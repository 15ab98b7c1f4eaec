mod common;
mod records;

pub use common::common_routes_with_ready;
pub use records::records_routes;

use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Upper bound for request bodies.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Complete application router: health/readiness plus all record routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(records_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES)),
        )
}
