use std::time::Duration;

use http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::log::{debug, trace};

use crate::client::RequestRunner;
use crate::error::{Error, Result};
use crate::request::GetRequest;
use crate::{ApiError, Response};

type Predicate<R> = Box<dyn Fn(&PollOutcome<R>) -> bool + Send + Sync>;

/// What one polling attempt observed.
///
/// A server-reported error status is an observation like any other here,
/// so callers can wait for statuses such as 404 after a delete.
#[derive(Debug)]
pub enum PollOutcome<R> {
    /// The request succeeded and decoded.
    Response(Response<R>),
    /// The server answered with an error envelope.
    Api(ApiError),
}

impl<R> PollOutcome<R> {
    pub fn status_code(&self) -> StatusCode {
        match self {
            | PollOutcome::Response(response) => response.status_code(),
            | PollOutcome::Api(api) => api.status_code(),
        }
    }

    pub fn response(&self) -> Option<&Response<R>> {
        match self {
            | PollOutcome::Response(response) => Some(response),
            | PollOutcome::Api(_) => None,
        }
    }

    pub fn into_response(self) -> Option<Response<R>> {
        match self {
            | PollOutcome::Response(response) => Some(response),
            | PollOutcome::Api(_) => None,
        }
    }
}

/// Repeatedly reissues a GET until its outcome satisfies the caller.
///
/// The interval is fixed, there is no backoff. An overall `timeout` is
/// required; `start` refuses to poll forever and fails fast without one.
/// Transport and decode failures abort polling immediately, only observed
/// statuses keep it going.
#[must_use]
pub struct PollRequest<'a, C, R> {
    request: GetRequest<'a, C, R>,
    interval: Duration,
    timeout: Option<Duration>,
    statuses: Vec<StatusCode>,
    predicates: Vec<Predicate<R>>,
}

impl<'a, C, R> PollRequest<'a, C, R>
where
    C: RequestRunner,
    R: DeserializeOwned + Send,
{
    pub(crate) fn new(request: GetRequest<'a, C, R>) -> Self {
        Self {
            request,
            interval: Duration::from_secs(1),
            timeout: None,
            statuses: Vec::new(),
            predicates: Vec::new(),
        }
    }

    /// Time to sleep between attempts. Defaults to one second.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Overall deadline for the whole poll. Mandatory.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a status to the accepted set. When none is added, only `200 OK`
    /// is accepted.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.statuses.push(status);
        self
    }

    /// Add a predicate that the outcome must satisfy, on top of the status
    /// check. All predicates must pass.
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PollOutcome<R>) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Poll until the accepted status and predicates hold, returning that
    /// attempt's outcome. Expiry of the overall timeout returns
    /// [`Error::PollDeadlineExceeded`], never a partial outcome.
    pub async fn start(self) -> Result<PollOutcome<R>> {
        let timeout = match self.timeout {
            | Some(timeout) => timeout,
            | None => return Err(Error::PollTimeoutRequired),
        };
        match tokio::time::timeout(timeout, self.run_attempts()).await {
            | Ok(outcome) => outcome,
            | Err(_) => Err(Error::PollDeadlineExceeded(timeout)),
        }
    }

    async fn run_attempts(&self) -> Result<PollOutcome<R>> {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            let outcome = match self.request.execute().await {
                | Ok(response) => PollOutcome::Response(response),
                | Err(Error::Api(api)) => PollOutcome::Api(api),
                | Err(e) => return Err(e),
            };
            let status = outcome.status_code();
            if self.is_accepted(status)
                && self.predicates.iter().all(|predicate| predicate(&outcome))
            {
                debug!("Polling settled on attempt {attempt} with '{status}'");
                return Ok(outcome);
            }
            trace!(
                "Attempt {attempt} observed '{status}', next attempt in {:?}",
                self.interval
            );
            tokio::time::sleep(self.interval).await;
        }
    }

    fn is_accepted(&self, status: StatusCode) -> bool {
        if self.statuses.is_empty() {
            return status == StatusCode::OK;
        }
        self.statuses.contains(&status)
    }
}
