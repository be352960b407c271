// src/models/assignment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::course::validate_not_blank;

/// Represents the 'assignments' table in the database.
/// Created once by a teacher and never modified afterwards.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    /// How many questions each attempt draws at start.
    pub num_questions: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for assigning an exam to every student of a course.
///
/// Fields default instead of failing deserialization so that a missing
/// field is reported as a validation error like any other bad input.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssignmentRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = validate_not_blank)
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    #[validate(
        required(message = "num_questions is required"),
        range(min = 1, max = 200, message = "num_questions must be between 1 and 200")
    )]
    pub num_questions: Option<i32>,
}

/// Response for a freshly created assignment.
#[derive(Debug, Serialize)]
pub struct AssignmentCreated {
    #[serde(flatten)]
    pub assignment: Assignment,
    /// Number of pending attempts fanned out to the roster.
    pub attempts_created: u64,
}

/// Assignment row with attempt counts per status, for the teacher's course view.
#[derive(Debug, Serialize, FromRow)]
pub struct AssignmentOverview {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub num_questions: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub pending_count: i64,
    pub started_count: i64,
    pub completed_count: i64,
    /// Mean score of completed attempts, if any.
    pub average_score: Option<f64>,
}
