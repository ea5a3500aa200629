use std::sync::Arc;

use axum::debug_handler;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::errors::ApiError;
use crate::extractors::ValidatedQuery;
use crate::pagination::ListParams;
use crate::AppState;

#[tracing::instrument(skip(state))]
#[debug_handler]
pub(crate) async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.accounts.get(id).await?;
    Ok(reply.into_response_with(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
#[debug_handler]
pub(crate) async fn list(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.accounts.list(params).await?;
    Ok(reply.into_response_with(StatusCode::OK))
}
