use async_trait::async_trait;
use http::Method;
use reqwest::IntoUrl;
use roster_api_model::{Account, Label, Organization, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::constants::{BASE_URL_ENV, DEFAULT_BASE_URL};
use crate::request::ResourceClient;
use crate::{Response, Result};

/// The transport seam every request goes through.
///
/// [`Client`] implements it directly. Wrappers that need to decorate
/// requests (extra headers, logging, capturing) implement it by delegating
/// to an inner runner and adjusting the step they care about.
#[async_trait]
pub trait RequestRunner: Send + Sync {
    /// Resolves a path like `/v1/accounts` against the configured base URL.
    fn make_url(&self, path: &str) -> Result<Url>;

    /// Starts a request for `url` with authentication applied but nothing
    /// sent yet.
    fn prepare_request(
        &self,
        method: Method,
        url: Url,
    ) -> Result<reqwest::RequestBuilder>;

    /// Consumes a raw transport response and produces the typed outcome.
    async fn process_response<T>(
        &self,
        response: reqwest::Response,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send;
}

/// An asynchronous client for a roster API service.
///
/// The client has various configuration options, but has reasonable defaults
/// that should suit most use-cases. To configure a client, use
/// [`Client::builder()`] or [`ClientBuilder::new()`]
///
/// a `Client` manages an internal connection pool, it's designed to be created
/// once and reused (via `Client::clone()`). You do **not** need to wrap
/// `Client` in [`Rc`] or [`Arc`] to reuse it.
///
/// [`Rc`]: std::rc::Rc
#[derive(Clone)]
pub struct Client {
    http_client: reqwest::Client,
    config: ClientConfig,
}

/// A `ClientBuilder` is what should be used to construct a `Client` with
/// custom configuration.
///
/// We default to the production roster service `https://api.roster.dev/`
/// unless the `ROSTER_BASE_URL` environment variable is defined.
/// Alternatively, `base_url` can be used to override the server url for this
/// particular client instance.
#[must_use]
#[derive(Default, Clone)]
pub struct ClientBuilder {
    config: Config,
}

impl ClientBuilder {
    /// Construct a new client builder with reasonable defaults. Use
    /// [`ClientBuilder::build`] to construct a client.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn base_url<T: IntoUrl>(mut self, base_url: T) -> Result<Self> {
        let mut base_url = base_url.into_url()?;
        // We want to make sure that the query string is empty.
        base_url.set_query(None);
        self.config.base_url = Some(base_url);
        Ok(self)
    }

    /// Bearer token attached to every request. Servers that do not enforce
    /// authentication, like a local development server, work without one.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Use a pre-configured [`reqwest::Client`] instance instead of creating
    /// our own. This allows customising TLS, timeout, and other low-level
    /// http client configuration options.
    pub fn reqwest_client(mut self, c: reqwest::Client) -> Self {
        self.config.reqwest_client = Some(c);
        self
    }

    /// Construct the roster client.
    pub fn build(self) -> Result<Client> {
        let http_client = match self.config.reqwest_client {
            | Some(c) => c,
            | None => {
                reqwest::ClientBuilder::new()
                    .redirect(reqwest::redirect::Policy::none())
                    .build()?
            }
        };

        let base_url = match self.config.base_url {
            | Some(c) => c,
            | None => {
                // Attempt to read from the environment variable before
                // falling back to the default.
                match std::env::var(BASE_URL_ENV) {
                    | Ok(base_url) => Url::parse(&base_url)?,
                    | Err(_) => DEFAULT_BASE_URL.clone(),
                }
            }
        };
        Ok(Client {
            http_client,
            config: ClientConfig {
                base_url,
                token: self.config.token,
            },
        })
    }
}

impl Client {
    /// Constructs a new client with the default configuration. This is **not**
    /// the recommended way to construct a client. We recommend using
    /// `Client::builder().build()` instead.
    ///
    /// # Panics
    ///
    /// This method panics if TLS backend cannot be initialised, or the
    /// underlying resolver cannot load the system configuration. Use
    /// [`Client::builder()`] if you wish to handle the failure as an
    /// [`crate::Error`] instead of panicking.
    pub fn new() -> Self {
        Self::builder().build().expect("Client::new()")
    }

    /// Creates a `ClientBuilder` to configure a `Client`.
    ///
    /// This is the same as `ClientBuilder::new()`.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Requests against the accounts collection.
    pub fn accounts(&self) -> ResourceClient<'_, Self, Account> {
        ResourceClient::new(self, "/v1/accounts", "accounts")
    }

    /// Requests against the organizations collection.
    pub fn organizations(&self) -> ResourceClient<'_, Self, Organization> {
        ResourceClient::new(self, "/v1/organizations", "organizations")
    }

    /// Requests against the labels of one account.
    pub fn account_labels(
        &self,
        account_id: impl AsRef<str>,
    ) -> ResourceClient<'_, Self, Label> {
        ResourceClient::new(
            self,
            format!("/v1/accounts/{}/labels", account_id.as_ref()),
            "account_labels",
        )
    }

    /// Requests against a caller-defined resource collection. The standard
    /// verbs and wire conventions apply as long as `R` implements
    /// [`Resource`].
    pub fn resource<R>(
        &self,
        path: impl Into<String>,
        metric: &'static str,
    ) -> ResourceClient<'_, Self, R>
    where
        R: Resource + Serialize + DeserializeOwned + Send,
    {
        ResourceClient::new(self, path, metric)
    }
}

#[async_trait]
impl RequestRunner for Client {
    fn make_url(&self, path: &str) -> Result<Url> {
        Ok(self.config.base_url.join(path)?)
    }

    fn prepare_request(
        &self,
        method: Method,
        url: Url,
    ) -> Result<reqwest::RequestBuilder> {
        let mut request = self.http_client.request(method, url);
        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn process_response<T>(
        &self,
        response: reqwest::Response,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send,
    {
        Response::from_raw_response(response).await
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default, Clone)]
struct Config {
    base_url: Option<Url>,
    token: Option<String>,
    reqwest_client: Option<reqwest::Client>,
}

#[derive(Clone)]
struct ClientConfig {
    base_url: Url,
    token: Option<String>,
}

// Ensure that Client is Send + Sync. Compiler will fail if it's not.
const _: () = {
    fn assert_send<T: Send + Sync>() {}
    let _ = assert_send::<Client>;
};
