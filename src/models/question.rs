// src/models/question.rs

use serde::Serialize;
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'questions' table in the database.
/// Rows are written by the question bank; this service only reads them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,

    /// The statement shown to the student.
    pub question: String,

    /// Exactly four alternatives, stored as a JSON array.
    pub alternatives: Json<Vec<String>>,

    /// The correct alternative, by value.
    pub correct_answer: String,

    pub subject: String,

    /// Path or URL of the optional illustration.
    pub image_url: Option<String>,

    /// Lowercase free-text tags.
    pub tags: Json<Vec<String>>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Answer key row for one entry of an attempt's fixed question set.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerKey {
    pub question_id: i64,
    pub correct_answer: String,
    pub tags: Json<Vec<String>>,
}

/// DTO for sending a fixed question to the student (excludes the correct answer and tags).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub position: i32,
    pub question: String,
    pub alternatives: Vec<String>,
    pub subject: String,
    pub image_url: Option<String>,
}

impl PublicQuestion {
    pub fn from_drawn(position: i32, q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            position,
            question: q.question,
            alternatives: q.alternatives.0,
            subject: q.subject,
            image_url: q.image_url,
        }
    }
}
