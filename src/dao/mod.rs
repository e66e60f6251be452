/// Persisted record shapes for matches and accounts.
pub mod models;
/// Path-addressed record storage and its backends.
pub mod record_store;
/// Storage abstraction layer for database operations.
pub mod storage;
