//! The `/api/v1` resource endpoints.

mod courses;
mod error;
mod students;

use crate::router::Router;

pub const API_PREFIX: &str = "/api/v1";

/// Every endpoint of the service.
pub fn routes() -> Router {
    courses::routes().merge(students::routes())
}
