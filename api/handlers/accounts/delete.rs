use std::sync::Arc;

use axum::debug_handler;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::errors::ApiError;
use crate::AppState;

#[tracing::instrument(skip(state))]
#[debug_handler]
pub(crate) async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.accounts.delete(id).await?;
    // Deletes answer with a status and no body.
    Ok(reply.status.unwrap_or(StatusCode::NO_CONTENT))
}
