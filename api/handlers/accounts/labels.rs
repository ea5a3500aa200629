use std::sync::Arc;

use axum::debug_handler;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use roster_api_model::Label;

use crate::errors::ApiError;
use crate::extractors::{ValidatedJson, ValidatedQuery};
use crate::pagination::ListParams;
use crate::AppState;

#[tracing::instrument(skip(state))]
#[debug_handler]
pub(crate) async fn list(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedQuery(params): ValidatedQuery<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.accounts.list_labels(id, params).await?;
    Ok(reply.into_response_with(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
#[debug_handler]
pub(crate) async fn add(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(label): ValidatedJson<Label>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.accounts.add_label(id, label).await?;
    Ok(reply.into_response_with(StatusCode::CREATED))
}
