use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::{Request, Response};

use crate::context::{RequestContext, TRACE_ID_HEADER};
use crate::response::BoxBody;

use super::{BoxFuture, Middleware, Next};

/// Echoes the request trace id in the `x-trace-id` response header and
/// stamps it into JSON error bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceIdMiddleware;

impl TraceIdMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for TraceIdMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request<Incoming>,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        Box::pin(async move {
            let response = next.run(req).await;
            let mut response = stamp_error_body(response, &ctx.trace_id).await;

            if let Ok(header_value) = HeaderValue::from_str(&ctx.trace_id) {
                response.headers_mut().insert(TRACE_ID_HEADER, header_value);
            }

            response
        })
    }
}

async fn stamp_error_body(response: Response<BoxBody>, trace_id: &str) -> Response<BoxBody> {
    let is_json_error = response.status().is_client_error() || response.status().is_server_error();
    let is_json_error = is_json_error
        && response
            .headers()
            .get(CONTENT_TYPE)
            .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if !is_json_error {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };

    let body = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(mut json) if json.get("error").is_some() => {
            json["trace_id"] = serde_json::Value::String(trace_id.to_string());
            serde_json::to_vec(&json).map(Bytes::from).unwrap_or(bytes)
        }
        _ => bytes,
    };

    Response::from_parts(parts, Full::new(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::response::IntoResponse;

    #[tokio::test]
    async fn test_stamp_error_body_replaces_trace_id() {
        let response = Error::not_found("gone").with_trace_id("random").into_response();
        let response = stamp_error_body(response, "request-7").await;

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["trace_id"], "request-7");
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_stamp_error_body_ignores_success() {
        let response = "plain".into_response();
        let response = stamp_error_body(response, "request-7").await;

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"plain");
    }
}
