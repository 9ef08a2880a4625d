//! Abstract request transport.
//!
//! The client composes its pipeline over this seam so the underlying HTTP
//! machinery stays swappable; `ReqwestTransport` is the production
//! implementation and tests substitute scripted mocks.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

use crate::{Response, Result};

/// A single wire-level request, rebuilt fresh for every attempt.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully resolved request URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Optional request body.
    pub body: Option<Bytes>,
}

/// Sends one HTTP request and yields the response or a fault.
///
/// Implementations must surface their faults through
/// [`HttpClientError::Transport`](crate::HttpClientError::Transport) and
/// abandon in-flight work when the returned future is dropped.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and wait for the complete response.
    async fn send(&self, request: TransportRequest) -> Result<Response>;
}

/// Production transport backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with standard settings.
    ///
    /// No client-level timeout is configured; deadlines are imposed per
    /// attempt by the request pipeline.
    pub fn new() -> Self {
        let inner = reqwest::Client::builder()
            .user_agent(concat!("fetchling/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("Failed to build HTTP client");

        Self { inner }
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<Response> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.inner.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        Response::from_reqwest(response).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for pipeline tests.

    use super::*;
    use http::StatusCode;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// One scripted outcome per attempt; the last entry repeats.
    pub(crate) enum Script {
        Respond {
            status: u16,
            content_type: Option<&'static str>,
            body: &'static str,
        },
        Fail,
        Hang,
    }

    pub(crate) struct MockTransport {
        script: Vec<Script>,
        calls: Mutex<Vec<TransportRequest>>,
    }

    impl MockTransport {
        pub(crate) fn new(script: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn always_json(status: u16, body: &'static str) -> Arc<Self> {
            Self::new(vec![Script::Respond {
                status,
                content_type: Some("application/json"),
                body,
            }])
        }

        pub(crate) fn attempts(&self) -> usize {
            self.calls.lock().len()
        }

        pub(crate) fn recorded(&self) -> Vec<TransportRequest> {
            self.calls.lock().clone()
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("scripted transport fault")]
    pub(crate) struct ScriptedFault;

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: TransportRequest) -> Result<Response> {
            let attempt = {
                let mut calls = self.calls.lock();
                calls.push(request.clone());
                calls.len() - 1
            };

            let step = self
                .script
                .get(attempt)
                .or_else(|| self.script.last())
                .expect("mock transport needs at least one scripted step");

            match step {
                Script::Respond {
                    status,
                    content_type,
                    body,
                } => {
                    let mut headers = HeaderMap::new();
                    if let Some(ct) = content_type {
                        headers.insert(
                            http::header::CONTENT_TYPE,
                            http::HeaderValue::from_static(ct),
                        );
                    }
                    Ok(Response::new(
                        StatusCode::from_u16(*status).unwrap(),
                        headers,
                        *body,
                        request.url,
                    ))
                }
                Script::Fail => Err(crate::HttpClientError::transport(ScriptedFault)),
                Script::Hang => {
                    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                    unreachable!("hung transport call should have been cancelled")
                }
            }
        }
    }
}
