// src/handlers/attempt.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, types::Json as SqlJson};

use crate::{
    error::AppError,
    models::{
        attempt::{
            AttemptStatus, CancelOutcome, LockedAttempt, StartedAttempt, StudentAttemptView,
            SubmitAttemptRequest, SubmitOutcome, SubmittedAnswer,
        },
        question::{AnswerKey, PublicQuestion, Question},
    },
    utils::normalize_email,
};

/// Per-question grading outcome, later persisted as a `results_detail` row.
#[derive(Debug, PartialEq, Eq)]
struct GradedQuestion {
    question_id: i64,
    chosen_answer: String,
    correct_answer: String,
    tags: Vec<String>,
    is_correct: bool,
}

#[derive(Debug)]
struct Grade {
    correct: i32,
    total: i32,
    score: i32,
    details: Vec<GradedQuestion>,
}

/// `round(100 * correct / total)` with halves rounded up; 0 when `total` is 0.
fn percentage(correct: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    (200 * correct + total) / (2 * total)
}

/// Grades submitted answers against the attempt's fixed question set.
///
/// The fixed set is authoritative: unanswered questions count as "" (wrong),
/// answers to questions outside the set are ignored, and when a question id
/// repeats the last answer wins.
fn grade(keys: &[AnswerKey], answers: &[SubmittedAnswer]) -> Grade {
    let submitted: HashMap<i64, &str> = answers
        .iter()
        .map(|a| (a.question_id, a.chosen_answer.as_str()))
        .collect();

    let details: Vec<GradedQuestion> = keys
        .iter()
        .map(|key| {
            let chosen = submitted.get(&key.question_id).copied().unwrap_or("");
            GradedQuestion {
                question_id: key.question_id,
                chosen_answer: chosen.to_string(),
                correct_answer: key.correct_answer.clone(),
                tags: key.tags.0.clone(),
                is_correct: chosen == key.correct_answer,
            }
        })
        .collect();

    let correct = details.iter().filter(|d| d.is_correct).count() as i32;
    let total = details.len() as i32;

    Grade {
        correct,
        total,
        score: percentage(correct, total),
        details,
    }
}

/// Locks the attempt row for the rest of the transaction and loads what the
/// lifecycle needs from its assignment.
async fn lock_attempt(conn: &mut PgConnection, attempt_id: i64) -> Result<LockedAttempt, AppError> {
    sqlx::query_as::<_, LockedAttempt>(
        r#"
        SELECT
            sa.id, sa.assignment_id, sa.student_email, sa.status,
            a.subject, a.num_questions
        FROM student_assignments sa
        JOIN assignments a ON a.id = sa.assignment_id
        WHERE sa.id = $1
        FOR UPDATE OF sa
        "#,
    )
    .bind(attempt_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Attempt {} not found", attempt_id)))
}

/// Lists a student's attempts with assignment and course metadata, newest first.
pub async fn list_student_attempts(
    State(pool): State<PgPool>,
    Path(student_email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, StudentAttemptView>(
        r#"
        SELECT
            sa.id AS student_assignment_id,
            sa.assignment_id,
            a.course_id,
            c.name AS course_name,
            a.title, a.description, a.subject, a.num_questions,
            sa.status, sa.score, sa.correct, sa.total,
            sa.created_at, sa.started_at, sa.completed_at
        FROM student_assignments sa
        JOIN assignments a ON a.id = sa.assignment_id
        JOIN courses c ON c.id = a.course_id
        WHERE sa.student_email = $1
        ORDER BY a.created_at DESC, sa.id DESC
        "#,
    )
    .bind(normalize_email(&student_email))
    .fetch_all(&pool)
    .await?;

    Ok(Json(attempts))
}

/// Starts (or restarts) an attempt with a fresh random question set.
///
/// There is no resume: any previous selection is discarded and a new one
/// is drawn. The attempt row stays locked until commit so two concurrent
/// starts cannot both persist a set.
pub async fn start_attempt(
    State(pool): State<PgPool>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    let attempt = lock_attempt(&mut tx, attempt_id).await?;
    attempt.status.ensure_can_start()?;

    let drawn = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, alternatives, correct_answer, subject, image_url, tags, created_at
        FROM questions
        WHERE subject = $1
        ORDER BY RANDOM()
        LIMIT $2
        "#,
    )
    .bind(&attempt.subject)
    .bind(i64::from(attempt.num_questions))
    .fetch_all(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to draw questions for attempt {}: {:?}", attempt_id, e);
        AppError::from(e)
    })?;

    // Returning here drops `tx`, which rolls back: the attempt keeps its prior state.
    if drawn.len() < attempt.num_questions as usize {
        tracing::warn!(
            attempt_id,
            subject = %attempt.subject,
            requested = attempt.num_questions,
            available = drawn.len(),
            "Not enough questions to start attempt"
        );
        return Err(AppError::InsufficientData(format!(
            "Subject '{}' has {} question(s); the assignment requires {}",
            attempt.subject,
            drawn.len(),
            attempt.num_questions
        )));
    }

    sqlx::query("DELETE FROM student_assignment_questions WHERE student_assignment_id = $1")
        .bind(attempt.id)
        .execute(&mut *tx)
        .await?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO student_assignment_questions (student_assignment_id, question_id, position) ",
    );
    builder.push_values(drawn.iter().enumerate(), |mut row, (i, q)| {
        row.push_bind(attempt.id)
            .push_bind(q.id)
            .push_bind(i as i32 + 1);
    });
    builder.build().execute(&mut *tx).await.map_err(|e| {
        tracing::error!("Failed to fix question set for attempt {}: {:?}", attempt_id, e);
        AppError::from(e)
    })?;

    let started_at = sqlx::query_scalar::<_, chrono::DateTime<chrono::Utc>>(
        r#"
        UPDATE student_assignments
        SET status = 'started', started_at = NOW()
        WHERE id = $1
        RETURNING started_at
        "#,
    )
    .bind(attempt.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        attempt_id,
        assignment_id = attempt.assignment_id,
        student = %attempt.student_email,
        restarted = attempt.status == AttemptStatus::Started,
        questions = drawn.len(),
        "Attempt started"
    );

    let questions = drawn
        .into_iter()
        .enumerate()
        .map(|(i, q)| PublicQuestion::from_drawn(i as i32 + 1, q))
        .collect();

    Ok(Json(StartedAttempt {
        student_assignment_id: attempt.id,
        status: AttemptStatus::Started,
        started_at,
        questions,
    }))
}

/// Grades and closes an attempt.
///
/// * Grades against the fixed question set, not the submitted ids.
/// * Writes the result summary, one detail row per fixed question (tags
///   copied as a snapshot) and the completed attempt in one transaction.
pub async fn submit_attempt(
    State(pool): State<PgPool>,
    Path(attempt_id): Path<i64>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    let attempt = lock_attempt(&mut tx, attempt_id).await?;
    attempt.status.ensure_can_submit()?;

    let keys = sqlx::query_as::<_, AnswerKey>(
        r#"
        SELECT saq.question_id, q.correct_answer, q.tags
        FROM student_assignment_questions saq
        JOIN questions q ON q.id = saq.question_id
        WHERE saq.student_assignment_id = $1
        ORDER BY saq.position ASC
        "#,
    )
    .bind(attempt.id)
    .fetch_all(&mut *tx)
    .await?;

    let graded = grade(&keys, &payload.answers);

    let result_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO results (student_email, subject, correct, total, student_assignment_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(&attempt.student_email)
    .bind(&attempt.subject)
    .bind(graded.correct)
    .bind(graded.total)
    .bind(attempt.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to save result for attempt {}: {:?}", attempt_id, e);
        AppError::from(e)
    })?;

    if !graded.details.is_empty() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"INSERT INTO results_detail
            (result_id, student_email, question_id, subject, tags, chosen_answer, correct_answer, is_correct) "#,
        );
        builder.push_values(&graded.details, |mut row, d| {
            row.push_bind(result_id)
                .push_bind(&attempt.student_email)
                .push_bind(d.question_id)
                .push_bind(&attempt.subject)
                .push_bind(SqlJson(d.tags.clone()))
                .push_bind(&d.chosen_answer)
                .push_bind(&d.correct_answer)
                .push_bind(d.is_correct);
        });
        builder.build().execute(&mut *tx).await?;
    }

    sqlx::query(
        r#"
        UPDATE student_assignments
        SET status = 'completed', completed_at = NOW(), score = $2, correct = $3, total = $4
        WHERE id = $1
        "#,
    )
    .bind(attempt.id)
    .bind(graded.score)
    .bind(graded.correct)
    .bind(graded.total)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        attempt_id,
        assignment_id = attempt.assignment_id,
        student = %attempt.student_email,
        correct = graded.correct,
        total = graded.total,
        score = graded.score,
        "Attempt submitted"
    );

    Ok(Json(SubmitOutcome {
        student_assignment_id: attempt.id,
        status: AttemptStatus::Completed,
        correct: graded.correct,
        total: graded.total,
        score: graded.score,
    }))
}

/// Cancels an attempt: drops its question set and returns it to `pending`.
///
/// Also the target of the browser's best-effort beacon when a student leaves
/// mid-attempt, so the request body is ignored.
pub async fn cancel_attempt(
    State(pool): State<PgPool>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    let attempt = lock_attempt(&mut tx, attempt_id).await?;
    attempt.status.ensure_can_cancel()?;

    let removed = sqlx::query(
        "DELETE FROM student_assignment_questions WHERE student_assignment_id = $1",
    )
    .bind(attempt.id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query(
        "UPDATE student_assignments SET status = 'pending', started_at = NULL WHERE id = $1",
    )
    .bind(attempt.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        attempt_id,
        student = %attempt.student_email,
        removed_questions = removed,
        "Attempt cancelled"
    );

    Ok(Json(CancelOutcome {
        student_assignment_id: attempt.id,
        status: AttemptStatus::Pending,
    }))
}
