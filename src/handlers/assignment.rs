// src/handlers/assignment.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::SubjectCatalog,
    error::AppError,
    handlers::course::fetch_course,
    models::{
        assignment::{Assignment, AssignmentCreated, AssignmentOverview, CreateAssignmentRequest},
        attempt::Attempt,
    },
    utils::html::clean_optional,
};

/// Assigns an exam to a course.
///
/// * Rejects bad input before touching the database.
/// * Inserts the assignment and one `pending` attempt per enrolled student
///   in a single transaction, so the fan-out is all or nothing.
pub async fn create_assignment(
    State(pool): State<PgPool>,
    State(subjects): State<SubjectCatalog>,
    Path(course_id): Path<i64>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let subject = subjects.parse(&payload.subject)?;
    let num_questions = payload
        .num_questions
        .ok_or_else(|| AppError::BadRequest("num_questions is required".to_string()))?;

    let mut tx = pool.begin().await?;

    fetch_course(&mut *tx, course_id).await?;

    let assignment = sqlx::query_as::<_, Assignment>(
        r#"
        INSERT INTO assignments (course_id, title, description, subject, num_questions)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, course_id, title, description, subject, num_questions, created_at
        "#,
    )
    .bind(course_id)
    .bind(payload.title.trim())
    .bind(clean_optional(payload.description.as_deref()))
    .bind(&subject)
    .bind(num_questions)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create assignment: {:?}", e);
        AppError::from(e)
    })?;

    let attempts_created = sqlx::query(
        r#"
        INSERT INTO student_assignments (assignment_id, student_email, status)
        SELECT $1, student_email, 'pending'::attempt_status
        FROM course_students
        WHERE course_id = $2
        "#,
    )
    .bind(assignment.id)
    .bind(course_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fan out assignment {}: {:?}", assignment.id, e);
        AppError::from(e)
    })?
    .rows_affected();

    tx.commit().await?;

    tracing::info!(
        assignment_id = assignment.id,
        course_id,
        subject = %assignment.subject,
        attempts_created,
        "Assignment created"
    );

    Ok((
        StatusCode::CREATED,
        Json(AssignmentCreated {
            assignment,
            attempts_created,
        }),
    ))
}

/// Lists a course's assignments with attempt counts per status.
pub async fn list_course_assignments(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    fetch_course(&pool, course_id).await?;

    let assignments = sqlx::query_as::<_, AssignmentOverview>(
        r#"
        SELECT
            a.id, a.course_id, a.title, a.description, a.subject, a.num_questions, a.created_at,
            COUNT(sa.id) FILTER (WHERE sa.status = 'pending') AS pending_count,
            COUNT(sa.id) FILTER (WHERE sa.status = 'started') AS started_count,
            COUNT(sa.id) FILTER (WHERE sa.status = 'completed') AS completed_count,
            (AVG(sa.score) FILTER (WHERE sa.status = 'completed'))::FLOAT8 AS average_score
        FROM assignments a
        LEFT JOIN student_assignments sa ON sa.assignment_id = a.id
        WHERE a.course_id = $1
        GROUP BY a.id
        ORDER BY a.created_at DESC, a.id DESC
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(assignments))
}

/// Lists every attempt of one assignment, for the teacher's follow-up view.
pub async fn list_assignment_attempts(
    State(pool): State<PgPool>,
    Path(assignment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM assignments WHERE id = $1")
        .bind(assignment_id)
        .fetch_optional(&pool)
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "Assignment {} not found",
            assignment_id
        )));
    }

    let attempts = sqlx::query_as::<_, Attempt>(
        r#"
        SELECT
            id, assignment_id, student_email, status, score, correct, total,
            created_at, started_at, completed_at
        FROM student_assignments
        WHERE assignment_id = $1
        ORDER BY student_email ASC
        "#,
    )
    .bind(assignment_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(attempts))
}
