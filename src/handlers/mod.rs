// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod challenge;
pub mod submission;
pub mod user;
