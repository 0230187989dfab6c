// src/services/mod.rs

pub mod progress;
pub mod submission;
