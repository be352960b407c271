// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::AppError, models::question::PublicQuestion};

/// Lifecycle of one student's attempt at one assignment.
///
/// `pending -> started -> completed`, with `started -> pending` on cancel.
/// `completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "attempt_status", rename_all = "lowercase")]
pub enum AttemptStatus {
    Pending,
    Started,
    Completed,
}

impl AttemptStatus {
    /// A fresh draw is allowed from `pending` and from `started` (restart).
    pub fn ensure_can_start(self) -> Result<(), AppError> {
        match self {
            AttemptStatus::Completed => Err(AppError::InvalidState(
                "Attempt already completed".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn ensure_can_cancel(self) -> Result<(), AppError> {
        match self {
            AttemptStatus::Completed => Err(AppError::InvalidState(
                "Cannot cancel a completed attempt".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Only a started attempt has a fixed set to grade, and grading happens once.
    pub fn ensure_can_submit(self) -> Result<(), AppError> {
        match self {
            AttemptStatus::Started => Ok(()),
            AttemptStatus::Pending => Err(AppError::InvalidState(
                "Attempt has not been started".to_string(),
            )),
            AttemptStatus::Completed => Err(AppError::InvalidState(
                "Attempt already submitted".to_string(),
            )),
        }
    }
}

/// Represents the 'student_assignments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attempt {
    pub id: i64,
    pub assignment_id: i64,
    pub student_email: String,
    pub status: AttemptStatus,
    /// 0..=100, set on completion.
    pub score: Option<i32>,
    pub correct: Option<i32>,
    pub total: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Attempt row locked `FOR UPDATE`, joined with what the lifecycle needs
/// from its assignment.
#[derive(Debug, FromRow)]
pub struct LockedAttempt {
    pub id: i64,
    pub assignment_id: i64,
    pub student_email: String,
    pub status: AttemptStatus,
    pub subject: String,
    pub num_questions: i32,
}

/// A student's attempt joined with assignment and course metadata.
#[derive(Debug, Serialize, FromRow)]
pub struct StudentAttemptView {
    pub student_assignment_id: i64,
    pub assignment_id: i64,
    pub course_id: i64,
    pub course_name: String,
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub num_questions: i32,
    pub status: AttemptStatus,
    pub score: Option<i32>,
    pub correct: Option<i32>,
    pub total: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One answer in a submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    /// Unanswered questions may be sent as "" or omitted entirely.
    #[serde(default)]
    pub chosen_answer: String,
}

/// DTO for submitting an attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

/// Response for a started attempt: the fixed question set, answers withheld.
#[derive(Debug, Serialize)]
pub struct StartedAttempt {
    pub student_assignment_id: i64,
    pub status: AttemptStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub questions: Vec<PublicQuestion>,
}

/// Official grading result of a submitted attempt.
#[derive(Debug, Serialize)]
pub struct SubmitOutcome {
    pub student_assignment_id: i64,
    pub status: AttemptStatus,
    pub correct: i32,
    pub total: i32,
    pub score: i32,
}

#[derive(Debug, Serialize)]
pub struct CancelOutcome {
    pub student_assignment_id: i64,
    pub status: AttemptStatus,
}
