use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

use crate::ApiError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unexpected error from the http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error(transparent)]
    UrlParserError(#[from] url::ParseError),
    #[error("Returned JSON does not conform to protocol: {0}")]
    ProtocolError(#[from] serde_json::Error),
    /// The server reported a failure through its error envelope.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The server reported a failure but the body was not a valid error
    /// envelope.
    #[error("Server returned '{status}' with a body that is not an error envelope: {source}")]
    MalformedError {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "Polling requires an overall timeout, set one with \
         `PollRequest::timeout`"
    )]
    PollTimeoutRequired,
    #[error("Polling deadline of {0:?} exceeded")]
    PollDeadlineExceeded(Duration),
}

impl Error {
    /// The HTTP status the server answered with, when there was an answer.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            | Error::Api(api) => Some(api.status_code()),
            | Error::MalformedError { status, .. } => Some(*status),
            | _ => None,
        }
    }
}
