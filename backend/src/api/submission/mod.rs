//! Module for abstract submission API endpoints.
//!
//! This module handles checking, submitting, listing and reviewing conference
//! abstracts. Every route is wrapped in the guard chain that matches its
//! audience.

pub mod handlers;
pub mod routes;
