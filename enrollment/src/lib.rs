//! A course and student enrollment REST service.
//!
//! Courses hold a roster of students capped by `MAX_STUDENTS_PER_COURSE`.
//! The cap is read on every write, so changing [`config::Settings`] affects
//! the next request.

pub mod api;
pub mod app;
pub mod capacity;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod model;
pub mod observability;
pub mod response;
pub mod router;
pub mod server;
pub mod state;
pub mod store;
pub mod testing;


pub mod prelude {
    pub use crate::app::App;
    pub use crate::config::Settings;
    pub use crate::context::RequestContext;
    pub use crate::error::{Error, IntoApiError, Result};
    pub use crate::extract::{Context, Created, Json, Path, PathParams, Payload, Query, Validated};
    pub use crate::middleware::{Middleware, Next};
    pub use crate::observability::TracingConfig;
    pub use crate::response::IntoResponse;
    pub use crate::router::Router;
    pub use crate::state::AppState;
    pub use crate::store::Store;

    pub use http::{Method, StatusCode};
    pub use serde::{Deserialize, Serialize};
}
