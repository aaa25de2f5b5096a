//! Integration tests for the `/api/v1/courses/` endpoints.

mod common;

use common::{COURSES, course_factory, course_url, setup, student_factory};
use enrollment::model::{Course, CourseFilter, StudentId};
use enrollment::prelude::*;
use serde_json::json;

#[tokio::test]
async fn test_get_first_course() {
    let fx = setup(20).await;
    let courses = course_factory(&fx.store, 1).await;

    let response = fx.client.get(&course_url(courses[0].id)).send().await;

    assert_eq!(response.status(), StatusCode::OK);
    let data: serde_json::Value = response.json();
    assert_eq!(data["name"], courses[0].name.as_str());
    assert_eq!(data["id"], courses[0].id.0);
    assert_eq!(data["students"], json!([]));
}

#[tokio::test]
async fn test_get_missing_course() {
    let fx = setup(20).await;

    let response = fx.client.get(&course_url(404)).send().await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let data: serde_json::Value = response.json();
    assert_eq!(data["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_all_courses() {
    let fx = setup(20).await;
    let courses = course_factory(&fx.store, 5).await;

    let response = fx.client.get(COURSES).send().await;

    assert_eq!(response.status(), StatusCode::OK);
    let data: Vec<Course> = response.json();
    assert_eq!(data.len(), courses.len());
    for (got, want) in data.iter().zip(&courses) {
        assert_eq!(got.name, want.name);
    }
}

#[tokio::test]
async fn test_get_courses_filter_id() {
    let fx = setup(20).await;
    let courses = course_factory(&fx.store, 5).await;

    let response = fx
        .client
        .get(COURSES)
        .query(&[("id", courses[2].id.0)])
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data: Vec<Course> = response.json();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].id, courses[2].id);
    assert_eq!(data[0].name, courses[2].name);
}

#[tokio::test]
async fn test_get_courses_filter_name() {
    let fx = setup(20).await;
    let courses = course_factory(&fx.store, 5).await;

    let response = fx
        .client
        .get(COURSES)
        .query(&[("name", courses[0].name.as_str())])
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data: Vec<Course> = response.json();
    assert_eq!(data.len(), 1);
    assert!(data.iter().all(|c| c.name == courses[0].name));
}

#[tokio::test]
async fn test_get_courses_filter_no_match() {
    let fx = setup(20).await;
    course_factory(&fx.store, 3).await;

    let response = fx
        .client
        .get(COURSES)
        .query(&[("name", "nobody teaches this")])
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data: Vec<Course> = response.json();
    assert!(data.is_empty());
}

#[tokio::test]
async fn test_get_courses_filter_bad_id() {
    let fx = setup(20).await;

    let response = fx.client.get("/api/v1/courses/?id=first").send().await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_course() {
    let fx = setup(20).await;
    let students = student_factory(&fx.store, 2).await;
    let ids: Vec<StudentId> = students.iter().map(|s| s.id).collect();

    let response = fx
        .client
        .post(COURSES)
        .json(&json!({"name": "Course 1", "students": ids}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Course = response.json();
    assert_eq!(created.name, "Course 1");
    assert_eq!(created.students, ids);

    let stored = fx.store.get_course(created.id).await.unwrap();
    assert_eq!(stored, created);
}

#[tokio::test]
async fn test_post_course_without_students() {
    let fx = setup(20).await;

    let response = fx
        .client
        .post(COURSES)
        .json(&json!({"name": "Empty"}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Course = response.json();
    assert!(created.students.is_empty());
}

#[tokio::test]
async fn test_post_course_over_cap() {
    let fx = setup(4).await;
    let students = student_factory(&fx.store, 5).await;
    let ids: Vec<StudentId> = students.iter().map(|s| s.id).collect();

    let response = fx
        .client
        .post(COURSES)
        .json(&json!({"name": "Crowded", "students": ids}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let data: serde_json::Value = response.json();
    assert_eq!(data["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(data["error"]["details"]["field"], "students");
    assert_eq!(data["error"]["details"]["error"], "max_count_exceeded");
    assert_eq!(data["error"]["details"]["max"], 4);
    assert_eq!(data["error"]["details"]["count"], 5);

    assert!(fx.store.list_courses(&CourseFilter::default()).await.is_empty());
}

#[tokio::test]
async fn test_post_course_unknown_student() {
    let fx = setup(20).await;

    let response = fx
        .client
        .post(COURSES)
        .json(&json!({"name": "Ghosts", "students": [999]}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let data: serde_json::Value = response.json();
    assert_eq!(data["error"]["details"]["error"], "does_not_exist");
    assert_eq!(data["error"]["details"]["id"], 999);
}

#[tokio::test]
async fn test_post_course_blank_name() {
    let fx = setup(20).await;

    let response = fx
        .client
        .post(COURSES)
        .json(&json!({"name": "", "students": []}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let data: serde_json::Value = response.json();
    assert_eq!(data["error"]["code"], "VALIDATION_ERROR");
    assert!(data["error"]["details"]["name"].is_array());
}

#[tokio::test]
async fn test_post_course_malformed_json() {
    let fx = setup(20).await;

    let response = fx
        .client
        .post(COURSES)
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let data: serde_json::Value = response.json();
    assert_eq!(data["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_patch_course() {
    let fx = setup(20).await;
    let students = student_factory(&fx.store, 1).await;
    let courses = course_factory(&fx.store, 1).await;

    let response = fx
        .client
        .patch(&course_url(courses[0].id))
        .json(&json!({"students": [students[0].id]}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data: serde_json::Value = response.json();
    assert_eq!(data["students"], json!([students[0].id.0]));
    assert_eq!(data["name"], courses[0].name.as_str());
}

#[tokio::test]
async fn test_patch_course_name_only() {
    let fx = setup(20).await;
    let courses = course_factory(&fx.store, 1).await;

    let response = fx
        .client
        .patch(&course_url(courses[0].id))
        .json(&json!({"name": "Renamed"}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data: Course = response.json();
    assert_eq!(data.name, "Renamed");
}

#[tokio::test]
async fn test_patch_missing_course() {
    let fx = setup(20).await;

    let response = fx
        .client
        .patch(&course_url(77))
        .json(&json!({"students": []}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_course_replaces_fields() {
    let fx = setup(20).await;
    let students = student_factory(&fx.store, 3).await;
    let courses = course_factory(&fx.store, 1).await;
    let url = course_url(courses[0].id);

    let response = fx
        .client
        .put(&url)
        .json(&json!({"name": "Replaced", "students": [students[2].id, students[0].id]}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data: Course = response.json();
    assert_eq!(data.name, "Replaced");
    assert_eq!(data.students, vec![students[2].id, students[0].id]);
}

#[tokio::test]
async fn test_put_course_requires_name() {
    let fx = setup(20).await;
    let courses = course_factory(&fx.store, 1).await;

    let response = fx
        .client
        .put(&course_url(courses[0].id))
        .json(&json!({"students": []}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_course() {
    let fx = setup(20).await;
    let courses = course_factory(&fx.store, 2).await;
    let url = course_url(courses[0].id);

    let response = fx.client.delete(&url).send().await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.bytes().is_empty());

    let response = fx.client.get(&url).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remaining: Vec<Course> = fx.client.get(COURSES).send().await.json();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, courses[1].id);
}

#[tokio::test]
async fn test_delete_missing_course() {
    let fx = setup(20).await;

    let response = fx.client.delete(&course_url(5)).send().await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn patch_students(max_count: usize, students_count: usize) -> (StatusCode, Course, Course) {
    let fx = setup(max_count).await;
    let course = course_factory(&fx.store, 1).await.remove(0);
    let students = student_factory(&fx.store, students_count).await;
    let ids: Vec<StudentId> = students.iter().map(|s| s.id).collect();

    let response = fx
        .client
        .patch(&course_url(course.id))
        .json(&json!({"students": ids}))
        .send()
        .await;

    let stored = fx.store.get_course(course.id).await.unwrap();
    (response.status(), course, stored)
}

#[tokio::test]
async fn test_max_students_exceeded() {
    let (status, before, after) = patch_students(4, 5).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_max_students_within_limit() {
    let (status, _, after) = patch_students(6, 3).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(after.students.len(), 3);
}

#[tokio::test]
async fn test_max_students_boundary() {
    let (status, _, after) = patch_students(3, 3).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(after.students.len(), 3);
}

#[tokio::test]
async fn test_max_students_read_per_request() {
    let fx = setup(2).await;
    let course = course_factory(&fx.store, 1).await.remove(0);
    let students = student_factory(&fx.store, 3).await;
    let ids: Vec<StudentId> = students.iter().map(|s| s.id).collect();
    let url = course_url(course.id);

    let response = fx
        .client
        .patch(&url)
        .json(&json!({"students": ids}))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    fx.settings.set_max_students_per_course(3);

    let response = fx
        .client
        .patch(&url)
        .json(&json!({"students": ids}))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_students_count_once() {
    let fx = setup(2).await;
    let students = student_factory(&fx.store, 2).await;
    let (a, b) = (students[0].id, students[1].id);

    let response = fx
        .client
        .post(COURSES)
        .json(&json!({"name": "Twice", "students": [a, b, a, b]}))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Course = response.json();
    assert_eq!(created.students, vec![a, b]);
}

#[tokio::test]
async fn test_post_course_form_encoded() {
    let fx = setup(20).await;
    let students = student_factory(&fx.store, 2).await;
    let form = format!(
        "name=Course+1&students={}&students={}",
        students[0].id, students[1].id
    );

    let response = fx
        .client
        .post(COURSES)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(form)
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Course = response.json();
    assert_eq!(created.name, "Course 1");
    assert_eq!(created.students, vec![students[0].id, students[1].id]);
}

#[tokio::test]
async fn test_patch_course_form_encoded_over_cap() {
    let fx = setup(1).await;
    let course = course_factory(&fx.store, 1).await.remove(0);
    let students = student_factory(&fx.store, 2).await;
    let form = format!("students={}&students={}", students[0].id, students[1].id);

    let response = fx
        .client
        .patch(&course_url(course.id))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(form)
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let data: serde_json::Value = response.json();
    assert_eq!(data["error"]["details"]["error"], "max_count_exceeded");
    assert_eq!(fx.store.get_course(course.id).await.unwrap(), course);
}
