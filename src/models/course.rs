use crate::error::{ApiError, FieldErrors};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{present, required_name};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
}

impl Course {
    pub fn with_students(self, students: Vec<i64>) -> CourseView {
        CourseView {
            id: self.id,
            name: self.name,
            students,
        }
    }
}

/// JSON representation of a course, including enrolled student ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseView {
    pub id: i64,
    pub name: String,
    pub students: Vec<i64>,
}

/// A course about to be inserted. `id` is assigned by the database when None.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub id: Option<i64>,
    pub name: String,
    pub students: Vec<i64>,
}

impl NewCourse {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            students: Vec::new(),
        }
    }
}

/// Fields to overwrite on an existing course; None leaves the field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChanges {
    pub name: Option<String>,
    pub students: Option<Vec<i64>>,
}

/// Request body for create, PUT and PATCH. Unknown fields (including `id`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoursePayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    pub students: Option<Vec<i64>>,
}

impl CoursePayload {
    pub fn into_new(self, max_students: usize) -> Result<NewCourse, ApiError> {
        let mut errors = FieldErrors::new();
        let name = required_name(self.name, &mut errors);
        let students = self
            .students
            .map(|ids| check_students(ids, max_students, &mut errors))
            .unwrap_or_default();
        errors.into_result()?;

        Ok(NewCourse {
            id: None,
            name,
            students,
        })
    }

    /// `partial` is PATCH semantics: omitted fields are left untouched.
    /// Otherwise `name` is required and omitted `students` clears the enrollment.
    pub fn into_changes(self, partial: bool, max_students: usize) -> Result<CourseChanges, ApiError> {
        let mut errors = FieldErrors::new();

        let name = match self.name {
            None if partial => None,
            name => Some(required_name(name, &mut errors)),
        };
        let students = match self.students {
            Some(ids) => Some(check_students(ids, max_students, &mut errors)),
            None if partial => None,
            None => Some(Vec::new()),
        };
        errors.into_result()?;

        Ok(CourseChanges { name, students })
    }
}

/// Sorts and de-duplicates student ids, then enforces the enrollment limit
fn check_students(mut ids: Vec<i64>, max_students: usize, errors: &mut FieldErrors) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    if ids.len() > max_students {
        errors.add(
            "students",
            format!("A course cannot have more than {} students.", max_students),
        );
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: Option<&str>, students: Option<Vec<i64>>) -> CoursePayload {
        CoursePayload {
            name: name.map(|name| Some(name.to_string())),
            students,
        }
    }

    fn field_errors(err: ApiError) -> FieldErrors {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_into_new_trims_name_and_sorts_students() {
        let new_course = payload(Some("  Rust 101 "), Some(vec![3, 1, 3, 2]))
            .into_new(20)
            .unwrap();
        assert_eq!(new_course.id, None);
        assert_eq!(new_course.name, "Rust 101");
        assert_eq!(new_course.students, vec![1, 2, 3]);
    }

    #[test]
    fn test_into_new_requires_name() {
        let errors = field_errors(payload(None, None).into_new(20).unwrap_err());
        assert_eq!(errors.get("name").unwrap(), ["This field is required.".to_string()]);

        let errors = field_errors(payload(Some("   "), None).into_new(20).unwrap_err());
        assert_eq!(errors.get("name").unwrap(), ["This field may not be blank.".to_string()]);
    }

    #[test]
    fn test_enrollment_limit() {
        let err = payload(Some("Full"), Some(vec![1, 2, 3])).into_new(2).unwrap_err();
        let errors = field_errors(err);
        assert_eq!(
            errors.get("students").unwrap(),
            ["A course cannot have more than 2 students.".to_string()]
        );

        // duplicates collapse before the limit applies
        assert!(payload(Some("Fits"), Some(vec![1, 1, 2])).into_new(2).is_ok());
    }

    #[test]
    fn test_partial_changes_leave_omitted_fields() {
        let changes = payload(Some("Updated Course"), None).into_changes(true, 20).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Updated Course"));
        assert_eq!(changes.students, None);

        let changes = payload(None, Some(vec![5])).into_changes(true, 20).unwrap();
        assert_eq!(changes.name, None);
        assert_eq!(changes.students, Some(vec![5]));
    }

    #[test]
    fn test_full_changes_require_name_and_reset_students() {
        assert!(payload(None, Some(vec![1])).into_changes(false, 20).is_err());

        let changes = payload(Some("Replaced"), None).into_changes(false, 20).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Replaced"));
        assert_eq!(changes.students, Some(Vec::new()));
    }

    #[test]
    fn test_null_name_differs_from_absent() {
        let null: CoursePayload = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(null.name, Some(None));
        let absent: CoursePayload = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.name, None);

        let errors = field_errors(null.clone().into_new(20).unwrap_err());
        assert_eq!(errors.get("name").unwrap(), ["This field may not be null.".to_string()]);

        let errors = field_errors(null.into_changes(true, 20).unwrap_err());
        assert_eq!(errors.get("name").unwrap(), ["This field may not be null.".to_string()]);
        assert_eq!(absent.into_changes(true, 20).unwrap().name, None);
    }

    #[test]
    fn test_payload_ignores_read_only_id() {
        let payload: CoursePayload =
            serde_json::from_str(r#"{"id": 99, "name": "New Course"}"#).unwrap();
        let new_course = payload.into_new(20).unwrap();
        assert_eq!(new_course.id, None);
        assert_eq!(new_course.name, "New Course");
    }
}
