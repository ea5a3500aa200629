use std::sync::Arc;

use axum::debug_handler;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use roster_api_model::Account;

use crate::errors::ApiError;
use crate::extractors::ValidatedJson;
use crate::AppState;

#[tracing::instrument(skip(state))]
#[debug_handler]
pub(crate) async fn create(
    State(state): State<Arc<AppState>>,
    ValidatedJson(account): ValidatedJson<Account>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state.accounts.create(account).await?;
    Ok(reply.into_response_with(StatusCode::CREATED))
}
