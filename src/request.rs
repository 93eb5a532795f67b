//! Read and validate job request messages before they touch the database

/// Read message files and validate them against a JSON schema
pub mod message;

/// Find job request messages in the message directory
pub mod read;

/// Load and compile the job request JSON schema
pub mod schema;
