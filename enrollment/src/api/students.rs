//! `/api/v1/students/` handlers.

use std::sync::Arc;

use http::{Request, StatusCode};
use hyper::body::Incoming;

use crate::error::Result;
use crate::extract::{
    Created, FromRequest, FromRequestParts, Json, Path, PathParams, Payload, Query, Validated,
};
use crate::model::{NewStudent, Student, StudentFilter, StudentId, StudentPatch};
use crate::router::Router;
use crate::state::AppState;

use super::API_PREFIX;

pub(super) fn routes() -> Router {
    let collection = format!("{}/students/", API_PREFIX);
    let item = format!("{}/students/:id/", API_PREFIX);

    Router::new()
        .get(&collection, list_students)
        .post(&collection, create_student)
        .get(&item, get_student)
        .put(&item, replace_student)
        .patch(&item, update_student)
        .delete(&item, delete_student)
}

async fn student_id(
    parts: &http::request::Parts,
    params: &PathParams,
    state: &Arc<AppState>,
) -> Result<StudentId> {
    Path::<StudentId>::from_request_parts(parts, params, state)
        .await
        .map(Path::into_inner)
}

pub async fn list_students(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Json<Vec<Student>>> {
    let Query(filter) = Query::<StudentFilter>::from_request(req, &params, &state).await?;
    Ok(Json(state.store().list_students(&filter).await))
}

pub async fn get_student(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Json<Student>> {
    let (parts, _) = req.into_parts();
    let id = student_id(&parts, &params, &state).await?;
    Ok(Json(state.store().get_student(id).await?))
}

pub async fn create_student(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Created<Student>> {
    let Validated(Payload(new)) =
        Validated::<Payload<NewStudent>>::from_request(req, &params, &state).await?;
    Ok(Created(state.store().create_student(new).await))
}

pub async fn replace_student(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Json<Student>> {
    let (parts, body) = req.into_parts();
    let id = student_id(&parts, &params, &state).await?;
    let req = Request::from_parts(parts, body);
    let Validated(Payload(new)) =
        Validated::<Payload<NewStudent>>::from_request(req, &params, &state).await?;

    let student = state.store().update_student(id, StudentPatch::from(new)).await?;
    Ok(Json(student))
}

pub async fn update_student(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<Json<Student>> {
    let (parts, body) = req.into_parts();
    let id = student_id(&parts, &params, &state).await?;
    let req = Request::from_parts(parts, body);
    let Validated(Payload(patch)) =
        Validated::<Payload<StudentPatch>>::from_request(req, &params, &state).await?;

    Ok(Json(state.store().update_student(id, patch).await?))
}

/// Deleting a student also removes it from every course roster.
pub async fn delete_student(
    req: Request<Incoming>,
    params: PathParams,
    state: Arc<AppState>,
) -> Result<StatusCode> {
    let (parts, _) = req.into_parts();
    let id = student_id(&parts, &params, &state).await?;
    state.store().delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
