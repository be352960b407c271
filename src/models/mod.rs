// src/models/mod.rs

pub mod assignment;
pub mod attempt;
pub mod course;
pub mod question;
pub mod result;
