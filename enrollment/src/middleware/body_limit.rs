use hyper::body::Incoming;
use hyper::{Request, Response};

use crate::context::RequestContext;
use crate::error::Error;
use crate::response::{BoxBody, IntoResponse};

use super::{BoxFuture, Middleware, Next};

pub const DEFAULT_MAX_SIZE: usize = 1024 * 1024; // 1MB

/// Body size cap for the current request, read by the body extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

/// Rejects requests whose declared `content-length` exceeds `max_size` and
/// records the cap in the request so extractors stop reading chunked bodies
/// at the same size.
pub struct BodyLimitMiddleware {
    pub(crate) max_size: usize,
}

impl BodyLimitMiddleware {
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }
}

impl Default for BodyLimitMiddleware {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl Middleware for BodyLimitMiddleware {
    fn handle<'a>(
        &'a self,
        mut req: Request<Incoming>,
        _ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        Box::pin(async move {
            let content_length = req
                .headers()
                .get(hyper::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());

            if let Some(len) = content_length.filter(|len| *len > self.max_size) {
                return Error::payload_too_large(format!(
                    "body of {} bytes exceeds limit of {} bytes",
                    len, self.max_size
                ))
                .into_response();
            }

            req.extensions_mut().insert(BodyLimit(self.max_size));
            next.run(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit() {
        assert_eq!(BodyLimitMiddleware::default().max_size, DEFAULT_MAX_SIZE);
    }
}
