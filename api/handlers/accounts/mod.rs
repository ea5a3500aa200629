mod create;
mod delete;
mod get;
mod labels;
mod update;

use std::sync::Arc;

use axum::Router;

use crate::AppState;

pub(crate) fn routes(shared_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", axum::routing::get(get::list))
        .route("/", axum::routing::post(create::create))
        .route("/:id", axum::routing::get(get::get))
        .route("/:id", axum::routing::patch(update::update))
        .route("/:id", axum::routing::delete(delete::delete))
        .route("/:id/labels", axum::routing::get(labels::list))
        .route("/:id/labels", axum::routing::post(labels::add))
        .with_state(shared_state)
}
