/// Spreadsheet mirror sink for accepted registrations.
pub mod mirror;
/// Persisted entity definitions and identifier canonicalization.
pub mod models;
/// Outbound push-notification transport.
pub mod notifier;
/// Whole-collection snapshot stores (JSON file, in-memory).
pub mod snapshot;
/// Storage fault taxonomy shared by all backends.
pub mod storage;
