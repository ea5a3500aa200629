use std::fmt;

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::log::warn;
use url::Url;

use crate::error::{Error, Result};

pub const REQUEST_ID_HEADER: &str = "x-roster-request-id";

// The error envelope roster servers attach to failed requests.
#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    code: Option<String>,
    reason: Option<String>,
}

/// A failure reported by the server itself, carrying the decoded error
/// envelope and the status code it arrived with.
#[derive(Debug, Clone)]
pub struct ApiError {
    status_code: StatusCode,
    code: Option<String>,
    reason: Option<String>,
    request_id: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.status_code)?;
        if let Some(ref code) = self.code {
            write!(f, " {}", code)?;
        }
        if let Some(ref reason) = self.reason {
            write!(f, ": {}", reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// A successful response from the server.
///
/// Failures, server-reported ones included, never produce a `Response`;
/// they travel as [`crate::Error`] instead. `body` is `None` when the
/// server answered with no payload at all, which is normal for deletes.
#[derive(Debug, Clone)]
pub struct Response<T> {
    body: Option<T>,
    url: Url,
    request_id: Option<String>,
    status_code: StatusCode,
    headers: http::HeaderMap,
}

impl<T> Response<T> {
    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<T> {
        self.body
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl<T> Response<T>
where
    T: DeserializeOwned,
{
    pub(crate) async fn from_raw_response(
        raw: reqwest::Response,
    ) -> Result<Self> {
        let url = raw.url().clone();
        let status_code = raw.status();
        let headers = raw.headers().clone();
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        // Reading the body to completion is also what releases the
        // underlying connection, so it happens on every path.
        let body = raw.text().await?;

        if status_code.as_u16() >= 400 {
            // Attempt to parse the error envelope as json
            return match serde_json::from_str::<ApiErrorBody>(&body) {
                | Ok(envelope) => {
                    Err(Error::Api(ApiError {
                        status_code,
                        code: envelope.code,
                        reason: envelope.reason,
                        request_id,
                    }))
                }
                | Err(e) => {
                    warn!(
                        "Response error body is not an error envelope. \
                         Error: {}. Body: {}",
                        e, body
                    );
                    Err(Error::MalformedError {
                        status: status_code,
                        source: e,
                    })
                }
            };
        }

        let body = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_str(&body)?)
        };
        Ok(Self {
            body,
            url,
            request_id,
            status_code,
            headers,
        })
    }
}
