//! Load job script templates and render them

/// Valid JSON messages are deserialised into a set of structs defined here
pub mod job_request;

/// Read script templates and render them with message content
pub mod job;
