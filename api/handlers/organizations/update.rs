use std::sync::Arc;

use axum::debug_handler;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use roster_api_model::Organization;

use crate::errors::ApiError;
use crate::extractors::ValidatedJson;
use crate::AppState;

#[tracing::instrument(skip(state))]
#[debug_handler]
pub(crate) async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<Organization>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.organizations.update(id, patch).await?;
    Ok(reply.into_response_with(StatusCode::OK))
}
