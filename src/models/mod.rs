pub mod course;
pub mod student;

pub use course::{Course, CourseChanges, CoursePayload, CourseView, NewCourse};
pub use student::{NewStudent, Student, StudentChanges, StudentPayload};

use crate::error::{ApiError, FieldErrors};
use serde::{Deserialize, Deserializer};

pub const MAX_NAME_LENGTH: usize = 255;

/// Validate and trim a required `name` field. The outer Option is whether the
/// key was sent at all. On failure the message is recorded in `errors` and the
/// returned value must be discarded.
pub(crate) fn required_name(name: Option<Option<String>>, errors: &mut FieldErrors) -> String {
    let name = match name {
        None => {
            errors.add("name", "This field is required.");
            return String::new();
        }
        Some(None) => {
            errors.add("name", "This field may not be null.");
            return String::new();
        }
        Some(Some(name)) => name,
    };

    let name = name.trim();
    if name.is_empty() {
        errors.add("name", "This field may not be blank.");
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            "name",
            format!("Ensure this field has no more than {} characters.", MAX_NAME_LENGTH),
        );
    }
    name.to_string()
}

/// `deserialize_with` helper for `Option<Option<T>>` fields: with
/// `#[serde(default)]` an absent key stays None and `null` becomes `Some(None)`
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Raw `?id=&name=` query string of a list request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Equality filters for list queries; every present field must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl ListParams {
    /// Empty values count as absent
    pub fn into_filter(self) -> Result<ListFilter, ApiError> {
        let mut errors = FieldErrors::new();

        let id = match self.id.as_deref() {
            None | Some("") => None,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("id", "Enter a number.");
                    None
                }
            },
        };
        let name = self.name.filter(|name| !name.is_empty());
        errors.into_result()?;

        Ok(ListFilter { id, name })
    }
}
