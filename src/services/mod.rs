/// Form handling and dashboard rendering on top of the session.
pub mod dashboard_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Signup, login and role lookup.
pub mod identity_service;
/// Match CRUD against the record store.
pub mod match_registry;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
