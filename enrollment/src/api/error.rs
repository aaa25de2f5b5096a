use serde_json::json;

use crate::capacity::CapacityExceeded;
use crate::error::{Error, IntoApiError};
use crate::store::StoreError;

impl IntoApiError for CapacityExceeded {
    fn into_api_error(self) -> Error {
        tracing::info!(max = self.max, count = self.count, "enrollment over cap rejected");
        Error::validation(self.to_string()).with_details(json!({
            "field": "students",
            "error": "max_count_exceeded",
            "max": self.max,
            "count": self.count,
        }))
    }
}

impl IntoApiError for StoreError {
    fn into_api_error(self) -> Error {
        match self {
            StoreError::CourseNotFound(_) | StoreError::StudentNotFound(_) => {
                Error::not_found(self.to_string())
            }
            StoreError::UnknownStudent(id) => Error::validation(self.to_string()).with_details(json!({
                "field": "students",
                "error": "does_not_exist",
                "id": id,
            })),
            StoreError::Capacity(exceeded) => exceeded.into_api_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseId, StudentId};

    #[test]
    fn test_capacity_maps_to_validation_error() {
        let err = StoreError::Capacity(CapacityExceeded { max: 4, count: 5 }).into_api_error();

        assert_eq!(err.status, 400);
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(
            err.details,
            Some(json!({"field": "students", "error": "max_count_exceeded", "max": 4, "count": 5}))
        );
    }

    #[test]
    fn test_unknown_student_maps_to_validation_error() {
        let err = StoreError::UnknownStudent(StudentId(9)).into_api_error();

        assert_eq!(err.status, 400);
        assert_eq!(err.details.unwrap()["error"], "does_not_exist");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = StoreError::CourseNotFound(CourseId(3)).into_api_error();
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "course 3 not found");
    }
}
