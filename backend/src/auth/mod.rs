//! Authentication module for managing user sessions and access control.
//!
//! This module provides login and registration, and the guard middleware
//! that decides whether a request may reach its handler: token
//! authentication, role, participant-type and ownership checks, rate
//! limiting, and the audit trail for every denial.

pub mod audit;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod service;
