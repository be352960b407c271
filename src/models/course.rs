// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidateEmail, ValidationError};

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Email of the teacher who owns the course.
    pub owner_email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Course row with its roster size, for the owner's course list.
#[derive(Debug, Serialize, FromRow)]
pub struct CourseSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub student_count: i64,
}

/// Represents the 'course_students' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseStudent {
    pub id: i64,
    pub course_id: i64,
    pub student_email: String,
    pub display_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(
        length(min = 1, max = 100, message = "Course name must be between 1 and 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(custom(
        function = validate_trimmed_email,
        message = "owner_email must be a valid email"
    ))]
    pub owner_email: String,
}

/// Query parameters for listing courses.
#[derive(Debug, Deserialize)]
pub struct CourseListParams {
    pub owner: Option<String>,
}

/// One row of a roster import. Blank or malformed emails are skipped, not rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentEntry {
    #[serde(default, alias = "email")]
    pub student_email: String,
    #[serde(default, alias = "name")]
    pub display_name: Option<String>,
}

/// DTO for importing students into a course.
#[derive(Debug, Deserialize, Validate)]
pub struct ImportStudentsRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "students must contain between 1 and 1000 entries"
    ))]
    pub students: Vec<StudentEntry>,
}

/// Outcome of a roster import.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: u64,
    pub skipped: u64,
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Email check on the trimmed value, matching how the handler stores it.
pub(crate) fn validate_trimmed_email(value: &str) -> Result<(), ValidationError> {
    if !value.trim().validate_email() {
        return Err(ValidationError::new("email"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_course_rejects_blank_name_and_bad_email() {
        let req = CreateCourseRequest {
            name: "   ".to_string(),
            description: None,
            owner_email: "not-an-email".to_string(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("owner_email"));
    }

    #[test]
    fn student_entry_accepts_short_aliases() {
        let entry: StudentEntry =
            serde_json::from_str(r#"{"email": "a@b.cl", "name": "Ana"}"#).unwrap();
        assert_eq!(entry.student_email, "a@b.cl");
        assert_eq!(entry.display_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn create_course_accepts_padded_owner_email() {
        let req = CreateCourseRequest {
            name: "4to Medio A".to_string(),
            description: None,
            owner_email: "  Prof@Colegio.cl ".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_import_is_rejected() {
        let req = ImportStudentsRequest { students: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn oversized_import_is_rejected() {
        let entry = StudentEntry {
            student_email: "a@b.cl".to_string(),
            display_name: None,
        };
        let req = ImportStudentsRequest {
            students: vec![entry; 1001],
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("students"));
    }
}
