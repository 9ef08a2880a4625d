//! # Fetchling
//!
//! A lightweight async HTTP client with per-attempt timeouts, retry with
//! exponential backoff, automatic JSON decoding, and a middleware chain.
//!
//! ## Features
//!
//! - **Retry with Backoff**: bounded attempts with exponential delay growth
//! - **Timeouts**: a cooperative deadline on every attempt
//! - **JSON by Default**: responses declaring a JSON content type decode
//!   automatically; everything else passes through raw
//! - **Middleware**: auth, logging, caching, or anything wrapping the
//!   request operation, applied in LIFO order
//! - **Layered Configuration**: library defaults, client overrides, and
//!   per-call options merged with documented precedence
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fetchling::{HttpClient, RequestOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new("https://api.example.com");
//!
//!     let user = client.get("/users/1", RequestOptions::new()).await?;
//!     println!("{:?}", user.json_value());
//!     Ok(())
//! }
//! ```
//!
//! ## With Retries and Middleware
//!
//! ```rust,no_run
//! use fetchling::{AuthMiddleware, HttpClient, LoggingMiddleware, RequestOptions};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let defaults = RequestOptions::new()
//!         .timeout(Duration::from_secs(30))
//!         .retries(3)
//!         .retry_delay(Duration::from_millis(100));
//!
//!     let client = HttpClient::with_defaults("https://api.example.com", defaults)
//!         .with_middleware(LoggingMiddleware::new())
//!         .with_middleware(AuthMiddleware::bearer("token"));
//!
//!     // Failed attempts retry automatically: 100ms, 200ms, 400ms.
//!     let order = client
//!         .post("/orders", &serde_json::json!({"item": "widget"}), RequestOptions::new())
//!         .await?;
//!
//!     println!("{:?}", order.json_value());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod middleware;
mod plugins;
mod response;
mod retry;
mod timeout;
mod transport;

pub use client::HttpClient;
pub use config::{RequestConfig, RequestOptions, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT};
pub use error::{HttpClientError, Result};
pub use middleware::{Middleware, Next, RequestContext};
pub use plugins::{AuthMiddleware, CacheMiddleware, LoggingMiddleware, NO_CACHE};
pub use response::{Reply, Response};
pub use retry::RetryPolicy;
pub use timeout::with_deadline;
pub use transport::{ReqwestTransport, Transport, TransportRequest};

// Re-export common types
pub use bytes::Bytes;
pub use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use fetchling::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::{RequestConfig, RequestOptions};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::middleware::{Middleware, Next, RequestContext};
    pub use crate::plugins::{AuthMiddleware, CacheMiddleware, LoggingMiddleware};
    pub use crate::response::{Reply, Response};
    pub use crate::retry::RetryPolicy;
    pub use crate::transport::{ReqwestTransport, Transport, TransportRequest};
    pub use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
}
