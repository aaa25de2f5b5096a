//! HTTP routing.
//!
//! The [`Router`] collects route definitions and matches incoming requests
//! to handlers. Patterns use `:param` segments and match trailing slashes
//! literally, so `/api/v1/courses/:id/` does not match `/api/v1/courses/1`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::header::{ALLOW, HeaderValue};
use http::{Method, Request, Response};
use hyper::body::Incoming;

use crate::error::Error;
use crate::extract::{PathParams, extract_path_params};
use crate::response::{BoxBody, IntoResponse};
use crate::state::AppState;

type BoxFuture = Pin<Box<dyn Future<Output = Response<BoxBody>> + Send>>;
type HandlerFn =
    Box<dyn Fn(Request<Incoming>, PathParams, Arc<AppState>) -> BoxFuture + Send + Sync>;

pub(crate) struct Route {
    pub(crate) pattern: String,
    handler: HandlerFn,
}

/// The HTTP router for matching requests to handlers.
///
/// Routes are matched in the order they are added. A path that matches some
/// route under a different method yields 405 with an `Allow` header; a path
/// that matches nothing yields 404.
///
/// # Examples
///
/// ```
/// use enrollment::prelude::*;
///
/// let router = Router::new()
///     .get("/health", |_, _, _| async { "ok" })
///     .delete("/items/:id/", |_, _, _| async { StatusCode::NO_CONTENT });
/// ```
pub struct Router {
    pub(crate) routes: Vec<(Method, Route)>,
}

macro_rules! method_route {
    ($(#[$doc:meta])* $name:ident, $method:expr) => {
        $(#[$doc])*
        pub fn $name<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
        where
            F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut
                + Send
                + Sync
                + Clone
                + 'static,
            Fut: Future<Output = Out> + Send + 'static,
            Out: IntoResponse + 'static,
        {
            self.route($method, pattern, handler)
        }
    };
}

impl Router {
    /// Creates a new empty router.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Adds a route with the given HTTP method and pattern.
    pub fn route<F, Fut, Out>(mut self, method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        let handler = Box::new(
            move |req: Request<Incoming>, params: PathParams, state: Arc<AppState>| {
                let handler = handler.clone();
                Box::pin(async move {
                    let output = handler(req, params, state).await;
                    output.into_response()
                }) as BoxFuture
            },
        );

        let route = Route {
            pattern: pattern.to_string(),
            handler,
        };

        self.routes.push((method, route));
        self
    }

    method_route!(
        /// Adds a GET route.
        get,
        Method::GET
    );
    method_route!(
        /// Adds a POST route.
        post,
        Method::POST
    );
    method_route!(
        /// Adds a PUT route.
        put,
        Method::PUT
    );
    method_route!(
        /// Adds a PATCH route.
        patch,
        Method::PATCH
    );
    method_route!(
        /// Adds a DELETE route.
        delete,
        Method::DELETE
    );

    /// Appends every route of `other` after the routes of `self`.
    pub fn merge(mut self, other: Router) -> Self {
        self.routes.extend(other.routes);
        self
    }

    /// Lists `(method, pattern)` pairs in registration order.
    pub fn route_table(&self) -> Vec<(Method, String)> {
        self.routes
            .iter()
            .map(|(method, route)| (method.clone(), route.pattern.clone()))
            .collect()
    }

    /// Handles an incoming request by matching it to a route.
    pub async fn handle(&self, req: Request<Incoming>, state: &Arc<AppState>) -> Response<BoxBody> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let mut allowed: Vec<&Method> = Vec::new();

        for (route_method, route) in &self.routes {
            let Some(params) = extract_path_params(&route.pattern, &path) else {
                continue;
            };
            if *route_method == method {
                return (route.handler)(req, params, state.clone()).await;
            }
            if !allowed.contains(&route_method) {
                allowed.push(route_method);
            }
        }

        if allowed.is_empty() {
            return Error::not_found(format!("no route for {}", path)).into_response();
        }

        let allow = allowed
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let mut response =
            Error::method_not_allowed(format!("method {} not allowed on {}", method, path))
                .into_response();
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(ALLOW, value);
        }
        response
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
