//! Middleware chain for the request pipeline.
//!
//! Middleware wrap the client's request operation: each one receives the
//! in-flight context plus a handle to the rest of the chain, and may adjust
//! the context before delegating, substitute the reply without delegating,
//! or observe the outcome around the call. The chain bottoms out in the
//! base retry/transport pipeline, so applying N middleware always yields
//! exactly N+1 nested invocations.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::config::RequestConfig;
use crate::response::Reply;
use crate::transport::Transport;
use crate::Result;

/// The in-flight request as middleware see it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Fully resolved request URL.
    pub url: Url,
    /// Resolved configuration; middleware may adjust it before delegating.
    pub config: RequestConfig,
}

/// A unit that wraps the client's request operation.
///
/// Implementations must either produce a reply or propagate the failure
/// from `next` unchanged; swallowing errors is reserved for middleware
/// whose documented purpose is to substitute a value, such as a cache.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Process the request and delegate to the rest of the chain.
    async fn handle(&self, ctx: RequestContext, next: Next) -> Result<Reply>;
}

/// Handle to the remainder of the chain.
///
/// Calling [`run`](Next::run) invokes the next middleware inward, or the
/// base retry/transport pipeline once the chain is exhausted.
#[derive(Clone)]
pub struct Next {
    middlewares: Arc<Vec<Arc<dyn Middleware>>>,
    transport: Arc<dyn Transport>,
    index: usize,
}

impl Next {
    pub(crate) fn new(
        middlewares: Arc<Vec<Arc<dyn Middleware>>>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            middlewares,
            transport,
            index: 0,
        }
    }

    /// Invoke the rest of the chain.
    pub async fn run(self, ctx: RequestContext) -> Result<Reply> {
        let middleware = self.middlewares.get(self.index).cloned();
        match middleware {
            Some(middleware) => {
                let next = Next {
                    index: self.index + 1,
                    ..self
                };
                middleware.handle(ctx, next).await
            }
            None => crate::client::perform(self.transport, ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RequestConfig, RequestOptions};
    use crate::transport::testing::MockTransport;
    use parking_lot::Mutex;

    fn context() -> RequestContext {
        RequestContext {
            url: "http://localhost/x".parse().unwrap(),
            config: RequestConfig::resolve(RequestOptions::new()),
        }
    }

    /// Records its tag when the call passes through it.
    struct Tagged {
        tag: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Middleware for Tagged {
        async fn handle(&self, ctx: RequestContext, next: Next) -> Result<Reply> {
            self.seen.lock().push(self.tag);
            next.run(ctx).await
        }
    }

    #[tokio::test]
    async fn test_chain_runs_in_list_order_down_to_the_pipeline() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = MockTransport::always_json(200, r#"{"ok":true}"#);

        let middlewares: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Tagged {
                tag: "outer",
                seen: Arc::clone(&seen),
            }),
            Arc::new(Tagged {
                tag: "inner",
                seen: Arc::clone(&seen),
            }),
        ];

        let reply = Next::new(Arc::new(middlewares), transport.clone())
            .run(context())
            .await
            .unwrap();

        assert!(reply.json_value().is_some());
        assert_eq!(*seen.lock(), vec!["outer", "inner"]);
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_empty_chain_reaches_the_pipeline_directly() {
        let transport = MockTransport::always_json(200, "{}");
        let reply = Next::new(Arc::new(Vec::new()), transport.clone())
            .run(context())
            .await
            .unwrap();

        assert!(matches!(reply, Reply::Json(_)));
        assert_eq!(transport.attempts(), 1);
    }
}
