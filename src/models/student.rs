use crate::error::{ApiError, FieldErrors};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{present, required_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
}

impl Student {
    /// Apply changes on top of the stored row
    pub fn merge(mut self, changes: StudentChanges) -> Self {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(birth_date) = changes.birth_date {
            self.birth_date = birth_date;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id: Option<i64>,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
}

impl NewStudent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            birth_date: None,
        }
    }
}

/// `birth_date: Some(None)` clears the date, `None` keeps it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub birth_date: Option<Option<NaiveDate>>,
}

impl StudentPayload {
    pub fn into_new(self) -> Result<NewStudent, ApiError> {
        let mut errors = FieldErrors::new();
        let name = required_name(self.name, &mut errors);
        errors.into_result()?;

        Ok(NewStudent {
            id: None,
            name,
            birth_date: self.birth_date.flatten(),
        })
    }

    pub fn into_changes(self, partial: bool) -> Result<StudentChanges, ApiError> {
        let mut errors = FieldErrors::new();
        let name = match self.name {
            None if partial => None,
            name => Some(required_name(name, &mut errors)),
        };
        errors.into_result()?;

        let birth_date = match self.birth_date {
            None if !partial => Some(None),
            other => other,
        };

        Ok(StudentChanges { name, birth_date })
    }
}
