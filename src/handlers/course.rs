// src/handlers/course.rs

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use validator::{Validate, ValidateEmail};

use crate::{
    error::AppError,
    models::course::{
        Course, CourseListParams, CourseStudent, CourseSummary, CreateCourseRequest,
        ImportStudentsRequest, ImportSummary, StudentEntry,
    },
    utils::{html::clean_optional, normalize_email},
};

/// A roster row that survived normalization and dedupe.
#[derive(Debug, PartialEq, Eq)]
struct NewStudent {
    email: String,
    display_name: Option<String>,
}

/// Normalizes an import batch and drops blank or malformed emails, repeats
/// inside the batch, and students already enrolled. The first occurrence of an
/// email wins.
fn plan_import(entries: &[StudentEntry], existing: &HashSet<String>) -> Vec<NewStudent> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut planned = Vec::new();

    for entry in entries {
        let email = normalize_email(&entry.student_email);
        if !email.validate_email() || existing.contains(&email) || !seen.insert(email.clone()) {
            continue;
        }
        let display_name = entry
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        planned.push(NewStudent {
            email,
            display_name,
        });
    }

    planned
}

/// Loads a course or fails with `NotFound`.
pub(crate) async fn fetch_course(
    executor: impl PgExecutor<'_>,
    course_id: i64,
) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>(
        "SELECT id, name, description, owner_email, created_at FROM courses WHERE id = $1",
    )
    .bind(course_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))
}

/// Creates an internal course owned by a teacher.
pub async fn create_course(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (name, description, owner_email)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, owner_email, created_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(clean_optional(payload.description.as_deref()))
    .bind(normalize_email(&payload.owner_email))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create course: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(course_id = course.id, owner = %course.owner_email, "Course created");

    Ok((StatusCode::CREATED, Json(course)))
}

/// Lists the courses owned by `?owner=`, newest first.
pub async fn list_courses(
    State(pool): State<PgPool>,
    Query(params): Query<CourseListParams>,
) -> Result<impl IntoResponse, AppError> {
    let owner = params
        .owner
        .as_deref()
        .map(normalize_email)
        .filter(|o| !o.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter 'owner' is required".to_string()))?;

    let courses = sqlx::query_as::<_, CourseSummary>(
        r#"
        SELECT
            c.id, c.name, c.description, c.owner_email, c.created_at,
            COUNT(cs.id) AS student_count
        FROM courses c
        LEFT JOIN course_students cs ON cs.course_id = c.id
        WHERE c.owner_email = $1
        GROUP BY c.id
        ORDER BY c.created_at DESC, c.id DESC
        "#,
    )
    .bind(owner)
    .fetch_all(&pool)
    .await?;

    Ok(Json(courses))
}

/// Lists the roster of a course.
pub async fn list_course_students(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    fetch_course(&pool, course_id).await?;

    let students = sqlx::query_as::<_, CourseStudent>(
        r#"
        SELECT id, course_id, student_email, display_name, created_at
        FROM course_students
        WHERE course_id = $1
        ORDER BY student_email ASC
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(students))
}

/// Imports students into a course without creating duplicates.
///
/// * Dedupes inside the batch and against the current roster.
/// * Locks the course row so concurrent imports serialize.
/// * `ON CONFLICT DO NOTHING` backs the dedupe at storage level.
pub async fn import_students(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
    Json(payload): Json<ImportStudentsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = pool.begin().await?;

    sqlx::query("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))?;

    let existing: HashSet<String> = sqlx::query_scalar::<_, String>(
        "SELECT student_email FROM course_students WHERE course_id = $1",
    )
    .bind(course_id)
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .collect();

    let planned = plan_import(&payload.students, &existing);

    let mut inserted = 0;
    if !planned.is_empty() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO course_students (course_id, student_email, display_name) ",
        );
        builder.push_values(&planned, |mut row, student| {
            row.push_bind(course_id)
                .push_bind(&student.email)
                .push_bind(&student.display_name);
        });
        builder.push(" ON CONFLICT (course_id, student_email) DO NOTHING");

        inserted = builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to import students: {:?}", e);
                AppError::from(e)
            })?
            .rows_affected();
    }

    tx.commit().await?;

    let summary = ImportSummary {
        inserted,
        skipped: payload.students.len() as u64 - inserted,
    };
    tracing::info!(course_id, inserted = summary.inserted, skipped = summary.skipped, "Students imported");

    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(email: &str, name: Option<&str>) -> StudentEntry {
        StudentEntry {
            student_email: email.to_string(),
            display_name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_plan_import_dedupes_within_batch() {
        let entries = vec![
            entry("ana@colegio.cl", Some("Ana")),
            entry(" ANA@colegio.cl ", Some("Ana Duplicada")),
            entry("beto@colegio.cl", None),
        ];

        let planned = plan_import(&entries, &HashSet::new());
        assert_eq!(
            planned,
            vec![
                NewStudent {
                    email: "ana@colegio.cl".to_string(),
                    display_name: Some("Ana".to_string()),
                },
                NewStudent {
                    email: "beto@colegio.cl".to_string(),
                    display_name: None,
                },
            ]
        );
    }

    #[test]
    fn test_plan_import_skips_existing_members() {
        let existing: HashSet<String> = ["ana@colegio.cl".to_string()].into_iter().collect();
        let entries = vec![entry("Ana@Colegio.cl", None), entry("carla@colegio.cl", None)];

        let planned = plan_import(&entries, &existing);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].email, "carla@colegio.cl");
    }

    #[test]
    fn test_plan_import_skips_malformed_emails() {
        let entries = vec![
            entry("juan perez", None),
            entry("sin-arroba.cl", None),
            entry("eva@colegio.cl", None),
        ];

        let planned = plan_import(&entries, &HashSet::new());
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].email, "eva@colegio.cl");
    }

    #[test]
    fn test_plan_import_drops_blank_emails_and_names() {
        let entries = vec![entry("   ", Some("Nadie")), entry("dani@colegio.cl", Some("  "))];

        let planned = plan_import(&entries, &HashSet::new());
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].display_name, None);
    }
}
