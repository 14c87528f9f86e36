//! Data access layer over the SQLite pool.

pub mod submission_repository;
pub mod user_repository;
