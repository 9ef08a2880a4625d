//! Request configuration.
//!
//! Configuration is merged from three layers, lowest to highest precedence:
//! library defaults, client-constructor overrides, per-call overrides.
//! Header maps and the extensions bag merge key-by-key; every other field
//! is overridden wholesale.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

use crate::retry::RetryPolicy;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default base delay between retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_000);

/// Configuration overrides for a client or a single call.
///
/// Unset fields fall through to the next layer down. Build fluently:
///
/// ```
/// use fetchling::RequestOptions;
/// use std::time::Duration;
///
/// let options = RequestOptions::new()
///     .timeout(Duration::from_secs(5))
///     .retries(3)
///     .header("X-Trace", "abc123");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method override.
    pub method: Option<Method>,
    /// Headers merged key-by-key over the layer below.
    pub headers: HeaderMap,
    /// Request body payload.
    pub body: Option<Bytes>,
    /// Per-attempt timeout.
    pub timeout: Option<Duration>,
    /// Maximum retries after the first attempt.
    pub retries: Option<u32>,
    /// Base delay before the first retry.
    pub retry_delay: Option<Duration>,
    /// Automatic JSON decoding of responses.
    pub parse_json: Option<bool>,
    /// Opaque flags for middleware to read.
    pub extensions: HashMap<String, serde_json::Value>,
}

impl RequestOptions {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a header. Invalid names or values are skipped.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Merge in a prepared header map.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the per-attempt timeout.
    ///
    /// The deadline applies to each attempt separately; a retried request
    /// may take up to `timeout × (retries + 1)` plus backoff overall.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of retries (0 = fail on the first error).
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Set the base retry delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Enable or disable automatic JSON decoding.
    pub fn parse_json(mut self, enable: bool) -> Self {
        self.parse_json = Some(enable);
        self
    }

    /// Attach an opaque extension flag for middleware.
    pub fn extension(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extensions.insert(name.into(), value.into());
        self
    }

    /// Lay `overrides` on top of this layer.
    pub(crate) fn merge(self, overrides: RequestOptions) -> RequestOptions {
        let RequestOptions {
            method,
            mut headers,
            body,
            timeout,
            retries,
            retry_delay,
            parse_json,
            mut extensions,
        } = self;

        for (name, value) in overrides.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        extensions.extend(overrides.extensions);

        RequestOptions {
            method: overrides.method.or(method),
            headers,
            body: overrides.body.or(body),
            timeout: overrides.timeout.or(timeout),
            retries: overrides.retries.or(retries),
            retry_delay: overrides.retry_delay.or(retry_delay),
            parse_json: overrides.parse_json.or(parse_json),
            extensions,
        }
    }
}

/// Fully resolved configuration for one request.
///
/// Immutable once the call is underway; middleware may adjust it before
/// handing the context inward.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// HTTP method.
    pub method: Method,
    /// Final header map.
    pub headers: HeaderMap,
    /// Request body payload.
    pub body: Option<Bytes>,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Maximum retries after the first attempt.
    pub retries: u32,
    /// Base delay before the first retry.
    pub retry_delay: Duration,
    /// Automatic JSON decoding of responses.
    pub parse_json: bool,
    /// Opaque flags for middleware to read.
    pub extensions: HashMap<String, serde_json::Value>,
}

impl RequestConfig {
    /// Fill library defaults into whatever the merged overrides left unset.
    pub(crate) fn resolve(options: RequestOptions) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        Self {
            method: options.method.unwrap_or(Method::GET),
            headers,
            body: options.body,
            timeout: options.timeout.unwrap_or(DEFAULT_TIMEOUT),
            retries: options.retries.unwrap_or(0),
            retry_delay: options.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            parse_json: options.parse_json.unwrap_or(true),
            extensions: options.extensions,
        }
    }

    /// Read a boolean extension flag; absent flags read as false.
    pub fn flag(&self, name: &str) -> bool {
        self.extensions
            .get(name)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// The retry policy this configuration describes.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.retry_delay)
    }
}
