//! Business-account onboarding portal: public intake, status tracking, and
//! the admin back office with templated notification emails.

pub mod admin;
pub mod config;
pub mod error;
pub mod http;
pub mod infra;
pub mod telemetry;
pub mod workflows;
