/// Load validated messages into the job table
pub mod message;
