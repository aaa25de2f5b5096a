//! Request extractors for parsing incoming HTTP requests.
//!
//! Handlers receive the raw request, the matched path parameters and the
//! shared state, and pull typed values out with [`FromRequest`] or
//! [`FromRequestParts`]:
//!
//! ```ignore
//! async fn show(req: Request<Incoming>, params: PathParams, state: Arc<AppState>) -> Result<Json<Course>> {
//!     let (parts, _) = req.into_parts();
//!     let Path(id) = Path::<CourseId>::from_request_parts(&parts, &params, &state).await?;
//!     Ok(Json(state.store().get_course(id).await?))
//! }
//! ```

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Request, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use validator::Validate;

use crate::context::RequestContext;
use crate::error::Error;
use crate::middleware::{BodyLimit, DEFAULT_MAX_SIZE};
use crate::response::{BoxBody, IntoResponse, body_response};
use crate::state::AppState;

/// A JSON request body or response payload.
///
/// As an extractor it returns 400 Bad Request when the body is not valid JSON
/// for `T`. As a response it serializes `T` with status 200.
#[derive(Debug)]
pub struct Json<T>(pub T);

/// A request body in JSON, or URL-encoded form fields when the request is
/// sent as `application/x-www-form-urlencoded`.
///
/// Form values arrive as strings. Fields named in [`FormFields::LIST_FIELDS`]
/// collect every repeated key (`students=1&students=2`) into a list.
#[derive(Debug)]
pub struct Payload<T>(pub T);

/// Describes how form-encoded fields map onto a payload type.
pub trait FormFields {
    /// Fields that take a list of values.
    const LIST_FIELDS: &'static [&'static str] = &[];
}

/// A JSON response with status 201 Created.
#[derive(Debug)]
pub struct Created<T>(pub T);

/// A single path parameter parsed with [`FromStr`].
#[derive(Debug)]
pub struct Path<T>(pub T);

/// The query string deserialized with `serde_urlencoded`.
#[derive(Debug)]
pub struct Query<T>(pub T);

/// The request's [`RequestContext`].
#[derive(Debug)]
pub struct Context(pub RequestContext);

/// Wraps an extractor and runs `validator` rules on the extracted value.
///
/// Failing rules produce a 400 `VALIDATION_ERROR` whose details carry the
/// per-field errors.
#[derive(Debug)]
pub struct Validated<T>(pub T);

/// Type alias for path parameters extracted from the URL.
pub type PathParams = HashMap<String, String>;

/// Trait for extractors that consume the request body.
pub trait FromRequest: Sized {
    fn from_request(
        req: Request<Incoming>,
        params: &PathParams,
        state: &Arc<AppState>,
    ) -> impl std::future::Future<Output = Result<Self, Error>> + Send;
}

/// Trait for extractors that only need request metadata.
pub trait FromRequestParts: Sized + Send {
    fn from_request_parts(
        parts: &http::request::Parts,
        params: &PathParams,
        state: &Arc<AppState>,
    ) -> impl std::future::Future<Output = Result<Self, Error>> + Send;
}

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Payload<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Path<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Query<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl Context {
    pub fn into_inner(self) -> RequestContext {
        self.0
    }

    pub fn trace_id(&self) -> &str {
        &self.0.trace_id
    }
}

impl<T> Validated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Parses a JSON body, shared by the extractor and the unit tests.
pub(crate) fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(bytes).map_err(|e| Error::bad_request(format!("invalid JSON: {}", e)))
}

/// Runs `validator` rules, mapping failures to a 400 with field details.
pub(crate) fn validate<T: Validate>(value: &T) -> Result<(), Error> {
    value.validate().map_err(|e| {
        Error::validation("validation failed")
            .with_details(serde_json::to_value(e).unwrap_or_default())
    })
}

/// Decodes URL-encoded form fields into `T`.
pub(crate) fn parse_form<T: DeserializeOwned + FormFields>(bytes: &[u8]) -> Result<T, Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes)
        .map_err(|e| Error::bad_request(format!("invalid form: {}", e)))?;

    let mut fields = serde_json::Map::new();
    for (key, value) in pairs {
        let key = match key.strip_suffix("[]") {
            Some(stripped) => stripped.to_string(),
            None => key,
        };
        if T::LIST_FIELDS.contains(&key.as_str()) {
            let entry = fields
                .entry(key)
                .or_insert_with(|| serde_json::Value::Array(Vec::new()));
            if let serde_json::Value::Array(items) = entry {
                items.push(serde_json::Value::String(value));
            }
        } else {
            fields.insert(key, serde_json::Value::String(value));
        }
    }

    serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| Error::bad_request(format!("invalid form: {}", e)))
}

/// Buffers the request body, refusing to read past the configured limit.
///
/// The limit comes from [`BodyLimit`] in the request extensions and falls
/// back to [`DEFAULT_MAX_SIZE`]. This also covers chunked bodies, which carry
/// no `Content-Length` for the middleware to check.
async fn read_body(req: Request<Incoming>) -> Result<(Option<String>, Bytes), Error> {
    let limit = req
        .extensions()
        .get::<BodyLimit>()
        .map_or(DEFAULT_MAX_SIZE, |limit| limit.0);
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let bytes = Limited::new(req.into_body(), limit)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                Error::payload_too_large(format!("body exceeds limit of {} bytes", limit))
            } else {
                Error::bad_request("failed to read body")
            }
        })?
        .to_bytes();

    Ok((content_type, bytes))
}

fn is_form(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

impl<T: DeserializeOwned + Send> FromRequest for Json<T> {
    async fn from_request(
        req: Request<Incoming>,
        _params: &PathParams,
        _state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        let (_, bytes) = read_body(req).await?;
        parse_json(&bytes).map(Json)
    }
}

impl<T: DeserializeOwned + FormFields + Send> FromRequest for Payload<T> {
    async fn from_request(
        req: Request<Incoming>,
        _params: &PathParams,
        _state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        let (content_type, bytes) = read_body(req).await?;
        if is_form(content_type.as_deref()) {
            parse_form(&bytes).map(Payload)
        } else {
            parse_json(&bytes).map(Payload)
        }
    }
}

fn json_response<T: serde::Serialize>(status: StatusCode, value: &T) -> http::Response<BoxBody> {
    match serde_json::to_vec(value) {
        Ok(body) => body_response(status, "application/json", Bytes::from(body)),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response");
            Error::internal("failed to serialize response").into_response()
        }
    }
}

impl<T: serde::Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> http::Response<BoxBody> {
        json_response(StatusCode::OK, &self.0)
    }
}

impl<T: serde::Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> http::Response<BoxBody> {
        json_response(StatusCode::CREATED, &self.0)
    }
}

impl<T: DeserializeOwned + Validate + Send> FromRequest for Validated<Json<T>> {
    async fn from_request(
        req: Request<Incoming>,
        params: &PathParams,
        state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        let json = Json::<T>::from_request(req, params, state).await?;
        validate(&json.0)?;
        Ok(Validated(json))
    }
}

impl<T: DeserializeOwned + FormFields + Validate + Send> FromRequest for Validated<Payload<T>> {
    async fn from_request(
        req: Request<Incoming>,
        params: &PathParams,
        state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        let payload = Payload::<T>::from_request(req, params, state).await?;
        validate(&payload.0)?;
        Ok(Validated(payload))
    }
}

impl FromRequestParts for Context {
    async fn from_request_parts(
        parts: &http::request::Parts,
        _params: &PathParams,
        _state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(Context)
            .ok_or_else(|| Error::internal("RequestContext not found"))
    }
}

impl<T: DeserializeOwned + Send> FromRequestParts for Query<T> {
    async fn from_request_parts(
        parts: &http::request::Parts,
        _params: &PathParams,
        _state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        let query = parts.uri.query().unwrap_or("");
        let value: T = serde_urlencoded::from_str(query)
            .map_err(|e| Error::bad_request(format!("invalid query: {}", e)))?;
        Ok(Query(value))
    }
}

impl<T: FromStr + Send> FromRequestParts for Path<T>
where
    T::Err: std::fmt::Display,
{
    async fn from_request_parts(
        _parts: &http::request::Parts,
        params: &PathParams,
        _state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        let value = params
            .values()
            .next()
            .ok_or_else(|| Error::bad_request("missing path param"))?;

        let parsed = value
            .parse::<T>()
            .map_err(|e| Error::bad_request(format!("invalid path param: {}", e)))?;

        Ok(Path(parsed))
    }
}

impl<T: FromRequestParts> FromRequest for T {
    async fn from_request(
        req: Request<Incoming>,
        params: &PathParams,
        state: &Arc<AppState>,
    ) -> Result<Self, Error> {
        let (parts, _body) = req.into_parts();
        Self::from_request_parts(&parts, params, state).await
    }
}

/// Matches `path` against a `:param` pattern, returning the captured values.
pub fn extract_path_params(pattern: &str, path: &str) -> Option<PathParams> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            if path_part.is_empty() {
                return None;
            }
            params.insert(param_name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}
