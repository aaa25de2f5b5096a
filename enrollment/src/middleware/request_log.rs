use hyper::body::Incoming;
use hyper::{Request, Response};
use tracing::{Instrument, info, info_span, warn};

use crate::context::RequestContext;
use crate::response::BoxBody;

use super::{BoxFuture, Middleware, Next};

/// Wraps each request in a `request` span and logs its outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogMiddleware;

impl RequestLogMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestLogMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request<Incoming>,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        let span = info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            trace_id = %ctx.trace_id,
        );

        Box::pin(
            async move {
                let response = next.run(req).await;
                let duration_ms = ctx.elapsed().as_millis() as u64;
                let status = response.status().as_u16();

                if response.status().is_server_error() {
                    warn!(status, duration_ms, "request failed");
                } else {
                    info!(status, duration_ms, "request completed");
                }

                response
            }
            .instrument(span),
        )
    }
}
