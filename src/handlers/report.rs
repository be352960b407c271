// src/handlers/report.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::SubjectCatalog,
    error::AppError,
    models::result::{ReportParams, ScorePoint, TagStat},
    utils::normalize_email,
};

/// Resolves the optional `?subject=` filter against the catalog.
fn subject_filter(
    subjects: &SubjectCatalog,
    params: &ReportParams,
) -> Result<Option<String>, AppError> {
    match params.subject.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => subjects.parse(raw).map(Some),
    }
}

/// Returns the configured subject catalog.
pub async fn list_subjects(State(subjects): State<SubjectCatalog>) -> impl IntoResponse {
    Json(subjects.all().to_vec())
}

/// Score history of a student, oldest first.
/// Only completed attempts ever write to `results`.
pub async fn score_timeseries(
    State(pool): State<PgPool>,
    State(subjects): State<SubjectCatalog>,
    Path(student_email): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    let subject = subject_filter(&subjects, &params)?;

    let points = sqlx::query_as::<_, ScorePoint>(
        r#"
        SELECT
            subject, correct, total,
            CASE WHEN total > 0 THEN FLOOR(100.0 * correct / total + 0.5)::INT ELSE 0 END AS score,
            student_assignment_id,
            created_at
        FROM results
        WHERE student_email = $1
          AND ($2::TEXT IS NULL OR subject = $2)
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(normalize_email(&student_email))
    .bind(subject)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch score timeseries: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(points))
}

/// Accuracy per tag over the student's answered questions, weakest first.
/// Tags come from the snapshot taken at submission time.
pub async fn tag_stats(
    State(pool): State<PgPool>,
    State(subjects): State<SubjectCatalog>,
    Path(student_email): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    let subject = subject_filter(&subjects, &params)?;

    let stats = sqlx::query_as::<_, TagStat>(
        r#"
        SELECT
            t.tag,
            COUNT(*) FILTER (WHERE rd.is_correct) AS correct,
            COUNT(*) FILTER (WHERE NOT rd.is_correct) AS wrong,
            COUNT(*) AS total,
            ROUND(100.0 * COUNT(*) FILTER (WHERE rd.is_correct) / COUNT(*), 2)::FLOAT8 AS accuracy
        FROM results_detail rd
        CROSS JOIN LATERAL jsonb_array_elements_text(rd.tags) AS t(tag)
        WHERE rd.student_email = $1
          AND ($2::TEXT IS NULL OR rd.subject = $2)
        GROUP BY t.tag
        ORDER BY accuracy ASC, t.tag ASC
        "#,
    )
    .bind(normalize_email(&student_email))
    .bind(subject)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch tag stats: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(stats))
}
