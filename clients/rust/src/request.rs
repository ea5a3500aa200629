use std::marker::PhantomData;
use std::time::{Duration, Instant};

use http::Method;
use metrics::{histogram, increment_counter};
use roster_api_model::{Paginated, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::log::{debug, info};
use url::Url;

use crate::client::RequestRunner;
use crate::error::{Error, Result};
use crate::poll::PollRequest;
use crate::Response;

/// Typed access to one resource collection.
///
/// The collection path and metric tag are fixed at construction. Every verb
/// hands back a single-use request builder with the HTTP method already
/// decided by the builder's type.
pub struct ResourceClient<'a, C, R> {
    runner: &'a C,
    path: String,
    metric: &'static str,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, C, R> ResourceClient<'a, C, R>
where
    C: RequestRunner,
    R: Resource + Serialize + DeserializeOwned + Send,
{
    pub fn new(
        runner: &'a C,
        path: impl Into<String>,
        metric: &'static str,
    ) -> Self {
        Self {
            runner,
            path: path.into(),
            metric,
            _resource: PhantomData,
        }
    }

    /// Fetch a single resource by id.
    pub fn get(&self, id: impl AsRef<str>) -> GetRequest<'a, C, R> {
        GetRequest {
            core: self.request_core(Some(id.as_ref().to_owned())),
            _resource: PhantomData,
        }
    }

    /// Fetch one page of the collection. Walking further pages is the
    /// caller's loop, there is no automatic traversal.
    pub fn list(&self) -> ListRequest<'a, C, R> {
        ListRequest {
            core: self.request_core(None),
            page: None,
            size: None,
            search: None,
            order: None,
            _resource: PhantomData,
        }
    }

    /// Create a new resource. `body` is the one and only request body.
    pub fn create(&self, body: R) -> CreateRequest<'a, C, R> {
        CreateRequest {
            core: self.request_core(None),
            body,
        }
    }

    /// Patch an existing resource with the populated fields of `body`.
    pub fn update(
        &self,
        id: impl AsRef<str>,
        body: R,
    ) -> UpdateRequest<'a, C, R> {
        UpdateRequest {
            core: self.request_core(Some(id.as_ref().to_owned())),
            body,
        }
    }

    /// Delete a resource by id.
    pub fn delete(&self, id: impl AsRef<str>) -> DeleteRequest<'a, C> {
        DeleteRequest {
            core: self.request_core(Some(id.as_ref().to_owned())),
        }
    }

    fn request_core(&self, segment: Option<String>) -> RequestCore<'a, C> {
        RequestCore {
            runner: self.runner,
            metric: self.metric,
            path: self.path.clone(),
            segment,
            query: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }
}

// State shared by all request builders. The URL is resolved at send time so
// that a builder can be re-issued by the poller.
struct RequestCore<'a, C> {
    runner: &'a C,
    metric: &'static str,
    path: String,
    segment: Option<String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl<'a, C> RequestCore<'a, C>
where
    C: RequestRunner,
{
    fn build_url(&self) -> Result<Url> {
        let mut url = self.runner.make_url(&self.path)?;
        if let Some(ref segment) = self.segment {
            // `push` percent-encodes the id, so ids with slashes or spaces
            // stay a single path segment.
            url.path_segments_mut()
                .map_err(|_| {
                    url::ParseError::RelativeUrlWithCannotBeABaseBase
                })?
                .push(segment);
        }
        for (name, value) in &self.query {
            url.query_pairs_mut().append_pair(name, value);
        }
        Ok(url)
    }

    fn prepare(&self, method: Method) -> Result<reqwest::RequestBuilder> {
        let url = self.build_url()?;
        info!("Sending a request '{} {}'", method, url);
        let mut request = self.runner.prepare_request(method, url)?;
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        Ok(request)
    }

    // One round trip: send, process, record metrics.
    async fn run<T>(
        &self,
        verb: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send,
    {
        let start = Instant::now();
        let outcome = match request.send().await {
            | Ok(raw) => self.runner.process_response(raw).await,
            | Err(e) => Err(Error::HttpClient(e)),
        };
        let latency = start.elapsed().as_secs_f64();
        let labels = [
            ("resource", self.metric.to_string()),
            ("method", verb.to_string()),
            ("status", outcome_label(&outcome)),
        ];
        increment_counter!("roster.client.requests_total", &labels);
        histogram!(
            "roster.client.request_duration_seconds",
            latency,
            &labels
        );
        outcome
    }
}

fn outcome_label<T>(outcome: &Result<Response<T>>) -> String {
    match outcome {
        | Ok(response) => response.status_code().as_u16().to_string(),
        | Err(e) => {
            match e.status_code() {
                | Some(status) => status.as_u16().to_string(),
                | None => "error".to_owned(),
            }
        }
    }
}

/// A single-use GET of one resource.
pub struct GetRequest<'a, C, R> {
    core: RequestCore<'a, C>,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, C, R> GetRequest<'a, C, R>
where
    C: RequestRunner,
    R: DeserializeOwned + Send,
{
    /// Append a query parameter. Calling this repeatedly with the same name
    /// sends the parameter that many times.
    pub fn parameter(
        mut self,
        name: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        self.core.query.push((name.into(), value.to_string()));
        self
    }

    /// Append a request header.
    pub fn header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.core.headers.push((name.into(), value.into()));
        self
    }

    /// Per-request timeout enforced by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.core.timeout = Some(timeout);
        self
    }

    /// Turn this request into a poller that reissues it until a condition
    /// holds.
    pub fn poll(self) -> PollRequest<'a, C, R> {
        PollRequest::new(self)
    }

    pub async fn send(self) -> Result<Response<R>> {
        self.execute().await
    }

    pub(crate) async fn execute(&self) -> Result<Response<R>> {
        let request = self.core.prepare(Method::GET)?;
        self.core.run("get", request).await
    }
}

/// A single-use GET of one collection page.
pub struct ListRequest<'a, C, R> {
    core: RequestCore<'a, C>,
    page: Option<i64>,
    size: Option<i64>,
    search: Option<String>,
    order: Option<String>,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, C, R> ListRequest<'a, C, R>
where
    C: RequestRunner,
    R: DeserializeOwned + Send,
{
    /// Index of the page to fetch, starting at 1.
    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Maximum number of items in the returned page.
    pub fn size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    /// Server-side filter expression.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Server-side sort expression.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Append a query parameter. Calling this repeatedly with the same name
    /// sends the parameter that many times.
    pub fn parameter(
        mut self,
        name: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        self.core.query.push((name.into(), value.to_string()));
        self
    }

    /// Append a request header.
    pub fn header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.core.headers.push((name.into(), value.into()));
        self
    }

    /// Per-request timeout enforced by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.core.timeout = Some(timeout);
        self
    }

    pub async fn send(mut self) -> Result<Response<Paginated<R>>> {
        if let Some(page) = self.page {
            self.core.query.push(("page".to_owned(), page.to_string()));
        }
        if let Some(size) = self.size {
            self.core.query.push(("size".to_owned(), size.to_string()));
        }
        if let Some(search) = self.search.take() {
            self.core.query.push(("search".to_owned(), search));
        }
        if let Some(order) = self.order.take() {
            self.core.query.push(("order".to_owned(), order));
        }
        let request = self.core.prepare(Method::GET)?;
        self.core.run("list", request).await
    }
}

/// A single-use POST creating one resource.
pub struct CreateRequest<'a, C, R> {
    core: RequestCore<'a, C>,
    body: R,
}

impl<'a, C, R> CreateRequest<'a, C, R>
where
    C: RequestRunner,
    R: Serialize + DeserializeOwned + Send + std::fmt::Debug,
{
    /// Append a query parameter. Calling this repeatedly with the same name
    /// sends the parameter that many times.
    pub fn parameter(
        mut self,
        name: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        self.core.query.push((name.into(), value.to_string()));
        self
    }

    /// Append a request header.
    pub fn header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.core.headers.push((name.into(), value.into()));
        self
    }

    /// Per-request timeout enforced by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.core.timeout = Some(timeout);
        self
    }

    pub async fn send(self) -> Result<Response<R>> {
        debug!("Request body: {:?}", self.body);
        let request = self.core.prepare(Method::POST)?.json(&self.body);
        self.core.run("create", request).await
    }
}

/// A single-use PATCH updating one resource.
pub struct UpdateRequest<'a, C, R> {
    core: RequestCore<'a, C>,
    body: R,
}

impl<'a, C, R> UpdateRequest<'a, C, R>
where
    C: RequestRunner,
    R: Serialize + DeserializeOwned + Send + std::fmt::Debug,
{
    /// Append a query parameter. Calling this repeatedly with the same name
    /// sends the parameter that many times.
    pub fn parameter(
        mut self,
        name: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        self.core.query.push((name.into(), value.to_string()));
        self
    }

    /// Append a request header.
    pub fn header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.core.headers.push((name.into(), value.into()));
        self
    }

    /// Per-request timeout enforced by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.core.timeout = Some(timeout);
        self
    }

    pub async fn send(self) -> Result<Response<R>> {
        debug!("Request body: {:?}", self.body);
        let request = self.core.prepare(Method::PATCH)?.json(&self.body);
        self.core.run("update", request).await
    }
}

/// A single-use DELETE of one resource. The server answers with no body, so
/// a successful response carries none.
pub struct DeleteRequest<'a, C> {
    core: RequestCore<'a, C>,
}

impl<'a, C> DeleteRequest<'a, C>
where
    C: RequestRunner,
{
    /// Append a query parameter. Calling this repeatedly with the same name
    /// sends the parameter that many times.
    pub fn parameter(
        mut self,
        name: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        self.core.query.push((name.into(), value.to_string()));
        self
    }

    /// Append a request header.
    pub fn header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.core.headers.push((name.into(), value.into()));
        self
    }

    /// Per-request timeout enforced by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.core.timeout = Some(timeout);
        self
    }

    pub async fn send(self) -> Result<Response<()>> {
        let request = self.core.prepare(Method::DELETE)?;
        self.core.run("delete", request).await
    }
}
