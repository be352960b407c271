// src/config.rs

use std::{env, net::SocketAddr, sync::Arc};

use dotenvy::dotenv;

use crate::error::AppError;

pub const DEFAULT_SUBJECTS: &str = "matematica,historia,ciencias,lenguaje";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub subjects: SubjectCatalog,
    pub cors_origins: Vec<String>,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5000)));

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let subjects = SubjectCatalog::from_csv(
            &env::var("SUBJECTS").unwrap_or_else(|_| DEFAULT_SUBJECTS.to_string()),
        );

        let cors_origins = split_csv(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        Self {
            database_url,
            rust_log,
            bind_addr,
            db_max_connections,
            subjects,
            cors_origins,
            log_dir,
        }
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The closed set of subjects questions, assignments and results may carry.
///
/// Loaded once at startup and shared by every handler, so the legal values
/// live in one place instead of being repeated per table.
#[derive(Debug, Clone)]
pub struct SubjectCatalog {
    subjects: Arc<Vec<String>>,
}

impl SubjectCatalog {
    pub fn new<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for s in subjects {
            let s = s.as_ref().trim().to_lowercase();
            if !s.is_empty() && !list.contains(&s) {
                list.push(s);
            }
        }
        Self {
            subjects: Arc::new(list),
        }
    }

    pub fn from_csv(raw: &str) -> Self {
        Self::new(split_csv(raw))
    }

    pub fn all(&self) -> &[String] {
        &self.subjects
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }

    /// Normalizes `raw` and checks it against the catalog.
    pub fn parse(&self, raw: &str) -> Result<String, AppError> {
        let subject = raw.trim().to_lowercase();
        if self.contains(&subject) {
            Ok(subject)
        } else {
            Err(AppError::BadRequest(format!(
                "Unknown subject '{}'. Expected one of: {}",
                raw.trim(),
                self.subjects.join(", ")
            )))
        }
    }
}

impl Default for SubjectCatalog {
    fn default() -> Self {
        Self::from_csv(DEFAULT_SUBJECTS)
    }
}
