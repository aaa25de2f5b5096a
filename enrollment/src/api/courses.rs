//! `/api/v1/courses/` handlers.
//!
//! Every write reads the enrollment cap from [`Settings`](crate::config::Settings)
//! at request time and hands it to the store, which checks the final roster
//! under its write lock.

use std::sync::Arc;

use http::{Request, StatusCode};
use hyper::body::Incoming;

use crate::error::Result;
use crate::extract::{
    Created, FromRequest, FromRequestParts, Json, Path, PathParams, Payload, Query, Validated,
};
use crate::model::{Course, CourseFilter, CourseId, CoursePatch, NewCourse};
use crate::router::Router;
use crate::state::AppState;

use super::API_PREFIX;

pub(super) fn routes() -> Router {
    let collection = format!("{}/courses/", API_PREFIX);
    let item = format!("{}/courses/:id/", API_PREFIX);

    Router::new()
        .get(&collection, list_courses)
        .post(&collection, create_course)
        .get(&item, get_course)
        .put(&item, replace_course)
        .patch(&item, update_course)
        .delete(&item, delete_course)
}

async fn course_id(
    parts: &http::request::Parts,
    params: &PathParams,
    state: &Arc<AppState>,
) -> Result<CourseId> {
    Path::<CourseId>::from_request_parts(parts, params, state)
        .await
        .map(Path::into_inner)
}

pub async fn list_courses(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Json<Vec<Course>>> {
    let Query(filter) = Query::<CourseFilter>::from_request(req, &params, &state).await?;
    Ok(Json(state.store().list_courses(&filter).await))
}

pub async fn get_course(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Json<Course>> {
    let (parts, _) = req.into_parts();
    let id = course_id(&parts, &params, &state).await?;
    Ok(Json(state.store().get_course(id).await?))
}

pub async fn create_course(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Created<Course>> {
    let Validated(Payload(new)) =
        Validated::<Payload<NewCourse>>::from_request(req, &params, &state).await?;
    let max = state.settings().max_students_per_course();
    let course = state.store().create_course(new, max).await?;
    Ok(Created(course))
}

/// PUT: every field is required and replaces the stored value.
pub async fn replace_course(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Json<Course>> {
    let (parts, body) = req.into_parts();
    let id = course_id(&parts, &params, &state).await?;
    let req = Request::from_parts(parts, body);
    let Validated(Payload(new)) =
        Validated::<Payload<NewCourse>>::from_request(req, &params, &state).await?;

    apply(&state, id, CoursePatch::from(new)).await
}

/// PATCH: absent fields keep their stored value.
pub async fn update_course(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Json<Course>> {
    let (parts, body) = req.into_parts();
    let id = course_id(&parts, &params, &state).await?;
    let req = Request::from_parts(parts, body);
    let Validated(Payload(patch)) =
        Validated::<Payload<CoursePatch>>::from_request(req, &params, &state).await?;

    apply(&state, id, patch).await
}

async fn apply(state: &AppState, id: CourseId, patch: CoursePatch) -> Result<Json<Course>> {
    let max = state.settings().max_students_per_course();
    let course = state.store().update_course(id, patch, max).await?;
    Ok(Json(course))
}

pub async fn delete_course(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<StatusCode> {
    let (parts, _) = req.into_parts();
    let id = course_id(&parts, &params, &state).await?;
    state.store().delete_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
