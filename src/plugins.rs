//! Example middleware: auth header injection, request logging, and
//! time-bounded GET caching.
//!
//! These illustrate the three shapes the [`Middleware`] contract allows —
//! adjusting the inbound context, observing the outcome, and substituting
//! the reply — and are not part of the core pipeline.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use parking_lot::Mutex;
use tracing::{error, info};

use crate::middleware::{Middleware, Next, RequestContext};
use crate::response::Reply;
use crate::Result;

/// Extension flag that makes a call bypass [`CacheMiddleware`].
pub const NO_CACHE: &str = "no_cache";

enum AuthScheme {
    Bearer(String),
    Basic { username: String, password: String },
    ApiKey { header: String, key: String },
}

/// Injects an authorization header into every outgoing request.
pub struct AuthMiddleware {
    scheme: AuthScheme,
}

impl AuthMiddleware {
    /// Create a bearer token middleware.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::Bearer(token.into()),
        }
    }

    /// Create an HTTP Basic middleware.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::Basic {
                username: username.into(),
                password: password.into(),
            },
        }
    }

    /// Create an API key middleware with a custom header name.
    pub fn api_key(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::ApiKey {
                header: header.into(),
                key: key.into(),
            },
        }
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
    if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
        headers.insert(name, value);
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn handle(&self, mut ctx: RequestContext, next: Next) -> Result<Reply> {
        let headers = &mut ctx.config.headers;

        match &self.scheme {
            AuthScheme::Bearer(token) => {
                insert_header(headers, AUTHORIZATION.as_str(), &format!("Bearer {token}"));
            }
            AuthScheme::Basic { username, password } => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                insert_header(
                    headers,
                    AUTHORIZATION.as_str(),
                    &format!("Basic {credentials}"),
                );
            }
            AuthScheme::ApiKey { header, key } => {
                insert_header(headers, header, key);
            }
        }

        next.run(ctx).await
    }
}

/// Logs the method, URL, elapsed time, and outcome of every request.
///
/// Purely observational: failures are re-raised unchanged.
#[derive(Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    /// Create a logging middleware.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(&self, ctx: RequestContext, next: Next) -> Result<Reply> {
        let method = ctx.config.method.clone();
        let url = ctx.url.clone();
        let start = Instant::now();

        match next.run(ctx).await {
            Ok(reply) => {
                info!(
                    method = %method,
                    url = %url,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request completed"
                );
                Ok(reply)
            }
            Err(err) => {
                error!(
                    method = %method,
                    url = %url,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "Request failed"
                );
                Err(err)
            }
        }
    }
}

struct CacheEntry {
    reply: Reply,
    stored_at: Instant,
}

/// Time-bounded memoization of successful GET replies.
///
/// Keyed by URL plus the resolved configuration, so calls that differ in
/// headers or flags never share an entry. Calls carrying the [`NO_CACHE`]
/// flag, and all non-GET methods, pass straight through. The store is
/// serialized behind a mutex and never held across a delegated call.
pub struct CacheMiddleware {
    ttl: Duration,
    store: Mutex<HashMap<String, CacheEntry>>,
}

impl CacheMiddleware {
    /// Create a cache that serves entries younger than `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            store: Mutex::new(HashMap::new()),
        }
    }

    fn cache_key(ctx: &RequestContext) -> String {
        format!(
            "{}|{:?}|{:?}",
            ctx.url, ctx.config.headers, ctx.config.extensions
        )
    }
}

#[async_trait]
impl Middleware for CacheMiddleware {
    async fn handle(&self, ctx: RequestContext, next: Next) -> Result<Reply> {
        if ctx.config.method != Method::GET || ctx.config.flag(NO_CACHE) {
            return next.run(ctx).await;
        }

        let key = Self::cache_key(&ctx);
        if let Some(entry) = self.store.lock().get(&key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Ok(entry.reply.clone());
            }
        }

        let reply = next.run(ctx).await?;
        self.store.lock().insert(
            key,
            CacheEntry {
                reply: reply.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(reply)
    }
}
