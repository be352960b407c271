// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{assignment, attempt, course, report},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (courses, assignments, student attempts, reports).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, subject catalog).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let course_routes = Router::new()
        .route("/", get(course::list_courses).post(course::create_course))
        .route("/{course_id}/students", get(course::list_course_students))
        .route("/{course_id}/import-students", post(course::import_students))
        .route("/{course_id}/assign", post(assignment::create_assignment))
        .route("/{course_id}/assignments", get(assignment::list_course_assignments));

    let assignment_routes = Router::new()
        .route("/{assignment_id}/attempts", get(assignment::list_assignment_attempts));

    // `{id}` is the student's email on the listing and the attempt id elsewhere;
    // the router needs one parameter name per segment.
    // `cancel` is also hit by the browser's unload beacon.
    let attempt_routes = Router::new()
        .route("/{id}", get(attempt::list_student_attempts))
        .route("/{id}/start", post(attempt::start_attempt))
        .route("/{id}/submit", post(attempt::submit_attempt))
        .route("/{id}/cancel", post(attempt::cancel_attempt));

    Router::new()
        .route("/api/subjects", get(report::list_subjects))
        .route("/api/score-timeseries/{student_email}", get(report::score_timeseries))
        .route("/api/tag-stats/{student_email}", get(report::tag_stats))
        .nest("/api/internal-courses", course_routes)
        .nest("/api/assignments", assignment_routes)
        .nest("/api/student-assignments", attempt_routes)
        // Global Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
