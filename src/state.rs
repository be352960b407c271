use crate::config::{Config, SubjectCatalog};
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for SubjectCatalog {
    fn from_ref(state: &AppState) -> Self {
        state.config.subjects.clone()
    }
}
