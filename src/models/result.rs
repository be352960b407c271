// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One point of a student's score history, built from the 'results' table.
#[derive(Debug, Serialize, FromRow)]
pub struct ScorePoint {
    pub subject: String,
    pub correct: i32,
    pub total: i32,
    pub score: i32,
    pub student_assignment_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Accuracy aggregate for one tag, built from 'results_detail' snapshots.
#[derive(Debug, Serialize, FromRow)]
pub struct TagStat {
    pub tag: String,
    pub correct: i64,
    pub wrong: i64,
    pub total: i64,
    /// Percentage of correct answers, two decimals.
    pub accuracy: f64,
}

/// Optional subject filter shared by the report endpoints.
#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub subject: Option<String>,
}
