// src/models/mod.rs

pub mod challenge;
pub mod submission;
pub mod user;
