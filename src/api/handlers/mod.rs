//! Thin request handlers: extract, call the core, shape the response.

pub mod audit_logs;
pub mod auth;
pub mod duties;
pub mod health_checks;
pub mod patients;
