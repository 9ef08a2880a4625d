//! HTTP client implementation.

use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method};
use serde::Serialize;
use url::Url;

use crate::config::{RequestConfig, RequestOptions};
use crate::middleware::{Middleware, Next, RequestContext};
use crate::response::{classify, Reply};
use crate::retry;
use crate::timeout::with_deadline;
use crate::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::{HttpClientError, Result};

/// HTTP client with per-attempt timeouts, retry with exponential backoff,
/// automatic JSON decoding, and a middleware chain.
///
/// Construct one at your composition root and share it by cloning; there is
/// no process-wide default instance.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    defaults: RequestOptions,
    middlewares: Vec<Arc<dyn Middleware>>,
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    /// Create a client with library defaults and the reqwest transport.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_defaults(base_url, RequestOptions::new())
    }

    /// Create a client with constructor-level configuration overrides.
    ///
    /// These sit between library defaults and per-call options in merge
    /// precedence.
    pub fn with_defaults(base_url: impl Into<String>, defaults: RequestOptions) -> Self {
        Self::with_transport(base_url, defaults, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(
        base_url: impl Into<String>,
        defaults: RequestOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            defaults,
            middlewares: Vec::new(),
            transport,
        }
    }

    /// Apply a middleware, returning the client for chained application.
    ///
    /// The most recently applied middleware is outermost at call time.
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.insert(0, Arc::new(middleware));
        self
    }

    /// The configured base URL prefix.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Reply> {
        self.request(path, options.method(Method::GET)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<Reply> {
        self.request(path, options.method(Method::DELETE)).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        options: RequestOptions,
    ) -> Result<Reply> {
        let options = json_payload(body, options.method(Method::POST))?;
        self.request(path, options).await
    }

    /// Send a PUT request with a JSON body.
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        options: RequestOptions,
    ) -> Result<Reply> {
        let options = json_payload(body, options.method(Method::PUT))?;
        self.request(path, options).await
    }

    /// Send a request with explicit options.
    ///
    /// Merges constructor defaults with the per-call options, prefixes
    /// `path` with the base URL, and runs the middleware chain down to the
    /// retry/transport pipeline. Resolves to the decoded JSON body, the raw
    /// response, or whatever a middleware substituted; fails with the first
    /// error that reaches the top uncaught.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Reply> {
        let merged = self.defaults.clone().merge(options);
        let config = RequestConfig::resolve(merged);

        let address = format!("{}{}", self.base_url, path);
        let url: Url = address
            .parse()
            .map_err(|_| HttpClientError::InvalidUrl(address))?;

        let ctx = RequestContext { url, config };
        Next::new(
            Arc::new(self.middlewares.clone()),
            Arc::clone(&self.transport),
        )
        .run(ctx)
        .await
    }
}

/// Base pipeline: the retry driver around a deadline-guarded transport
/// call, with classification applied to every attempt's outcome.
pub(crate) async fn perform(transport: Arc<dyn Transport>, ctx: RequestContext) -> Result<Reply> {
    let RequestContext { url, config } = ctx;
    let policy = config.retry_policy();

    retry::run(&policy, || {
        let request = TransportRequest {
            method: config.method.clone(),
            url: url.clone(),
            headers: config.headers.clone(),
            body: config.body.clone(),
        };
        let transport = Arc::clone(&transport);
        let deadline = config.timeout;
        let parse_json = config.parse_json;

        async move {
            let response = with_deadline(deadline, transport.send(request)).await?;
            classify(response, parse_json)
        }
    })
    .await
}

/// Serialize a JSON body into the options, defaulting the content type.
fn json_payload<T: Serialize + ?Sized>(
    body: &T,
    mut options: RequestOptions,
) -> Result<RequestOptions> {
    let payload = serde_json::to_vec(body)?;
    if !options.headers.contains_key(CONTENT_TYPE) {
        options
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    Ok(options.body(payload))
}
