// src/handlers/mod.rs

pub mod assignment;
pub mod attempt;
pub mod course;
pub mod report;
