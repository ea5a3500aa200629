use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use roster_api_model::{Account, Label, Organization, Paginated};
use serde::Serialize;
use thiserror::Error;

use crate::pagination::ListParams;

/// Failures a service backend reports back to the routing layer.
///
/// Everything that is not one of the client-attributable cases goes through
/// `Internal`, whose payload is logged server-side and never leaves the
/// process.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// A successful service result: the body plus an optional status override.
///
/// The routing layer pre-populates the status per operation (200 for reads
/// and updates, 201 for creates, 204 for deletes). Backends that need a
/// different status set it with [`Reply::with_status`], otherwise `From<T>`
/// leaves the default in place.
#[derive(Debug)]
pub struct Reply<T> {
    pub body: T,
    pub status: Option<StatusCode>,
}

impl<T> Reply<T> {
    pub fn with_status(body: T, status: StatusCode) -> Self {
        Self {
            body,
            status: Some(status),
        }
    }
}

impl<T> From<T> for Reply<T> {
    fn from(body: T) -> Self {
        Self { body, status: None }
    }
}

impl<T> Reply<T>
where
    T: Serialize,
{
    pub(crate) fn into_response_with(
        self,
        default_status: StatusCode,
    ) -> axum::response::Response {
        let status = self.status.unwrap_or(default_status);
        (status, Json(self.body)).into_response()
    }
}

/// The accounts backend the router dispatches to.
///
/// `rosterd` plugs in the in-memory implementation; a real deployment plugs
/// in one backed by its store. Pagination defaults are already applied to
/// `params` by the time a method is called.
#[async_trait]
pub trait AccountsService: Send + Sync + 'static {
    async fn list(
        &self,
        params: ListParams,
    ) -> Result<Reply<Paginated<Account>>, ServiceError>;

    async fn get(&self, id: String) -> Result<Reply<Account>, ServiceError>;

    async fn create(
        &self,
        account: Account,
    ) -> Result<Reply<Account>, ServiceError>;

    /// Applies the populated fields of `patch` over the stored record.
    async fn update(
        &self,
        id: String,
        patch: Account,
    ) -> Result<Reply<Account>, ServiceError>;

    async fn delete(&self, id: String) -> Result<Reply<()>, ServiceError>;

    async fn list_labels(
        &self,
        id: String,
        params: ListParams,
    ) -> Result<Reply<Paginated<Label>>, ServiceError>;

    async fn add_label(
        &self,
        id: String,
        label: Label,
    ) -> Result<Reply<Label>, ServiceError>;
}

/// The organizations backend. Same contract as [`AccountsService`], minus
/// sub-resources.
#[async_trait]
pub trait OrganizationsService: Send + Sync + 'static {
    async fn list(
        &self,
        params: ListParams,
    ) -> Result<Reply<Paginated<Organization>>, ServiceError>;

    async fn get(
        &self,
        id: String,
    ) -> Result<Reply<Organization>, ServiceError>;

    async fn create(
        &self,
        organization: Organization,
    ) -> Result<Reply<Organization>, ServiceError>;

    async fn update(
        &self,
        id: String,
        patch: Organization,
    ) -> Result<Reply<Organization>, ServiceError>;

    async fn delete(&self, id: String) -> Result<Reply<()>, ServiceError>;
}
