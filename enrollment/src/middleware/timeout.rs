use std::time::Duration;

use hyper::body::Incoming;
use hyper::{Request, Response};

use crate::config::{DEFAULT_REQUEST_TIMEOUT_SECS, ServerConfig};
use crate::context::RequestContext;
use crate::error::Error;
use crate::response::{BoxBody, IntoResponse};

use super::{BoxFuture, Middleware, Next};

/// Answers 500 when the rest of the chain outlives the time budget. The
/// handler future is dropped, so a write still waiting on the store lock
/// never lands.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutMiddleware {
    pub(crate) budget: Duration,
}

impl TimeoutMiddleware {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Uses the budget from `ENROLLMENT_REQUEST_TIMEOUT_SECS`.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.request_timeout)
    }
}

impl Default for TimeoutMiddleware {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }
}

impl Middleware for TimeoutMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request<Incoming>,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        Box::pin(async move {
            let Ok(response) = tokio::time::timeout(self.budget, next.run(req)).await else {
                let budget_ms = self.budget.as_millis() as u64;
                tracing::warn!(trace_id = %ctx.trace_id, budget_ms, "request abandoned");
                return Error::internal(format!("request exceeded {}ms", budget_ms))
                    .into_response();
            };
            response
        })
    }
}
