// src/utils/mod.rs

pub mod html;

/// Canonical form of a student or teacher email: trimmed, lowercase.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
