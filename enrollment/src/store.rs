//! In-process record store for students and courses.
//!
//! All tables sit behind one async reader/writer lock. A write holds the lock
//! for its whole validate-then-apply sequence, so a rejected write changes
//! nothing and concurrent writers cannot slip past the enrollment cap.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::capacity::{CapacityExceeded, check_roster, dedup_roster};
use crate::model::{
    Course, CourseFilter, CourseId, CoursePatch, NewCourse, NewStudent, Student, StudentFilter,
    StudentId, StudentPatch,
};

/// Failures of store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    /// A course roster references a student that does not exist.
    #[error("invalid student id {0}: object does not exist")]
    UnknownStudent(StudentId),
    #[error(transparent)]
    Capacity(#[from] CapacityExceeded),
}

#[derive(Debug, Default)]
struct Tables {
    students: BTreeMap<StudentId, Student>,
    courses: BTreeMap<CourseId, Course>,
    last_student_id: u64,
    last_course_id: u64,
}

impl Tables {
    /// Turns submitted ids into a stored roster: duplicates collapse, every id
    /// must exist, and the result must fit under `max`.
    fn resolve_roster(
        &self,
        submitted: Vec<StudentId>,
        max: usize,
    ) -> Result<Vec<StudentId>, StoreError> {
        let roster = dedup_roster(submitted);
        if let Some(missing) = roster.iter().find(|id| !self.students.contains_key(id)) {
            return Err(StoreError::UnknownStudent(*missing));
        }
        check_roster(&roster, max)?;
        Ok(roster)
    }
}

/// Shared handle to the record tables. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct Store {
    tables: Arc<RwLock<Tables>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list_students(&self, filter: &StudentFilter) -> Vec<Student> {
        let tables = self.tables.read().await;
        tables
            .students
            .values()
            .filter(|s| filter.matches(&s.id, &s.name))
            .cloned()
            .collect()
    }

    pub async fn get_student(&self, id: StudentId) -> Result<Student, StoreError> {
        let tables = self.tables.read().await;
        tables
            .students
            .get(&id)
            .cloned()
            .ok_or(StoreError::StudentNotFound(id))
    }

    pub async fn create_student(&self, new: NewStudent) -> Student {
        let mut tables = self.tables.write().await;
        tables.last_student_id += 1;
        let student = Student {
            id: StudentId(tables.last_student_id),
            name: new.name,
            birth_date: new.birth_date,
        };
        tables.students.insert(student.id, student.clone());
        tracing::debug!(student_id = %student.id, "student created");
        student
    }

    pub async fn update_student(
        &self,
        id: StudentId,
        patch: StudentPatch,
    ) -> Result<Student, StoreError> {
        let mut tables = self.tables.write().await;
        let student = tables
            .students
            .get_mut(&id)
            .ok_or(StoreError::StudentNotFound(id))?;
        if let Some(name) = patch.name {
            student.name = name;
        }
        if let Some(birth_date) = patch.birth_date {
            student.birth_date = birth_date;
        }
        Ok(student.clone())
    }

    /// Removes a student and drops it from every course roster.
    pub async fn delete_student(&self, id: StudentId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .students
            .remove(&id)
            .ok_or(StoreError::StudentNotFound(id))?;
        for course in tables.courses.values_mut() {
            course.students.retain(|s| *s != id);
        }
        tracing::debug!(student_id = %id, "student deleted");
        Ok(())
    }

    pub async fn list_courses(&self, filter: &CourseFilter) -> Vec<Course> {
        let tables = self.tables.read().await;
        tables
            .courses
            .values()
            .filter(|c| filter.matches(&c.id, &c.name))
            .cloned()
            .collect()
    }

    pub async fn get_course(&self, id: CourseId) -> Result<Course, StoreError> {
        let tables = self.tables.read().await;
        tables
            .courses
            .get(&id)
            .cloned()
            .ok_or(StoreError::CourseNotFound(id))
    }

    /// Creates a course whose roster holds at most `max_students` students.
    pub async fn create_course(
        &self,
        new: NewCourse,
        max_students: usize,
    ) -> Result<Course, StoreError> {
        let mut tables = self.tables.write().await;
        let students = tables.resolve_roster(new.students, max_students)?;

        tables.last_course_id += 1;
        let course = Course {
            id: CourseId(tables.last_course_id),
            name: new.name,
            students,
        };
        tables.courses.insert(course.id, course.clone());
        tracing::debug!(course_id = %course.id, enrolled = course.students.len(), "course created");
        Ok(course)
    }

    /// Applies `patch` to a course. The resulting roster, submitted or kept,
    /// must fit under `max_students`.
    pub async fn update_course(
        &self,
        id: CourseId,
        patch: CoursePatch,
        max_students: usize,
    ) -> Result<Course, StoreError> {
        let mut tables = self.tables.write().await;
        let current = tables
            .courses
            .get(&id)
            .ok_or(StoreError::CourseNotFound(id))?;

        let submitted = patch.students.unwrap_or_else(|| current.students.clone());
        let students = tables.resolve_roster(submitted, max_students)?;

        let course = tables
            .courses
            .get_mut(&id)
            .ok_or(StoreError::CourseNotFound(id))?;
        if let Some(name) = patch.name {
            course.name = name;
        }
        course.students = students;
        tracing::debug!(course_id = %id, enrolled = course.students.len(), "course updated");
        Ok(course.clone())
    }

    pub async fn delete_course(&self, id: CourseId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .courses
            .remove(&id)
            .ok_or(StoreError::CourseNotFound(id))?;
        tracing::debug!(course_id = %id, "course deleted");
        Ok(())
    }
}
