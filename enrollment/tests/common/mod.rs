//! Shared fixtures for the API integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use enrollment::api;
use enrollment::model::{Course, NewCourse, NewStudent, Student};
use enrollment::prelude::*;
use enrollment::testing::TestClient;

pub const COURSES: &str = "/api/v1/courses/";
pub const STUDENTS: &str = "/api/v1/students/";

pub fn course_url(id: impl std::fmt::Display) -> String {
    format!("{}{}/", COURSES, id)
}

pub fn student_url(id: impl std::fmt::Display) -> String {
    format!("{}{}/", STUDENTS, id)
}

/// A running service plus handles to its store and live settings.
pub struct Fixture {
    pub client: TestClient,
    pub store: Store,
    pub settings: Settings,
}

pub async fn setup(max_students_per_course: usize) -> Fixture {
    let store = Store::new();
    let settings = Settings::new(max_students_per_course);
    let app = App::new()
        .store(store.clone())
        .settings(settings.clone())
        .router(api::routes());

    Fixture {
        client: TestClient::new(app).await,
        store,
        settings,
    }
}

fn random_name(prefix: &str) -> String {
    format!("{} {}", prefix, uuid::Uuid::new_v4().simple())
}

/// Inserts `quantity` students with random names straight into the store.
pub async fn student_factory(store: &Store, quantity: usize) -> Vec<Student> {
    let mut students = Vec::with_capacity(quantity);
    for _ in 0..quantity {
        let student = store
            .create_student(NewStudent {
                name: random_name("student"),
                birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            })
            .await;
        students.push(student);
    }
    students
}

/// Inserts `quantity` empty courses with random names straight into the store.
pub async fn course_factory(store: &Store, quantity: usize) -> Vec<Course> {
    let mut courses = Vec::with_capacity(quantity);
    for _ in 0..quantity {
        let course = store
            .create_course(
                NewCourse {
                    name: random_name("course"),
                    students: Vec::new(),
                },
                0,
            )
            .await
            .unwrap();
        courses.push(course);
    }
    courses
}
