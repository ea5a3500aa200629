use std::sync::Arc;

use axum::Router;

use crate::AppState;

pub(crate) mod accounts;
pub(crate) mod organizations;

pub(crate) fn routes(shared_state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/accounts", accounts::routes(shared_state.clone()))
        .nest("/organizations", organizations::routes(shared_state))
}
