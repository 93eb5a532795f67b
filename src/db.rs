//! All job state is stored in a SQLite database

/// Connect to a SQLite database
pub mod open;
pub mod job;
/// Ingest validated job request messages
pub mod ingest;
