use std::sync::Arc;

use axum::debug_handler;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use roster_api_model::Organization;

use crate::errors::ApiError;
use crate::extractors::ValidatedJson;
use crate::AppState;

#[tracing::instrument(skip(state))]
#[debug_handler]
pub(crate) async fn create(
    State(state): State<Arc<AppState>>,
    ValidatedJson(organization): ValidatedJson<Organization>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.organizations.create(organization).await?;
    Ok(reply.into_response_with(StatusCode::CREATED))
}
