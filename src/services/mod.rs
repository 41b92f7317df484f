/// Read-only administrator aggregates and probes.
pub mod admin_service;
/// Authorization predicate for administrator-only operations.
pub mod auth;
/// Notification campaign runner.
pub mod broadcast_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Sign-up intake and participation queries.
pub mod registration_service;
