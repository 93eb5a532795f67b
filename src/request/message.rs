use std::fs;
use std::path::Path;

use jsonschema::JSONSchema;
use log::{info, warn};
use serde_json::Value;

use crate::slurm::job_request::JobRequest;

#[derive(Debug)]
pub enum MessageError {
    MessageReadError,
    JSONDecodeError,
}

/// A job request message judged against the schema and ready for ingestion.
///
/// Messages that decode but fail validation keep their content and are
/// ingested with `valid` unset, so a bad request stays inspectable in the
/// database instead of vanishing.
#[derive(Debug)]
pub struct Message {
    pub key: String,
    pub content: String,
    pub valid: bool,
}

impl Message {
    pub fn read(path: &Path, schema: &JSONSchema) -> Result<Message, MessageError> {
        let key = message_key(path);
        let content = read_file(path)?;
        let json = parse_untyped_json(path, &content)?;
        let valid = validate(schema, &json) && deserialise(json);

        Ok(Message { key, content, valid })
    }
}

/// Message key, taken from the file name without its extension
fn message_key(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

fn read_file(path: &Path) -> Result<String, MessageError> {
    info!("Reading message at {}", path.display());
    fs::read_to_string(path).map_err(|err| {
        warn!("Can't read message at path {}: {}", path.display(), err);
        MessageError::MessageReadError
    })
}

fn parse_untyped_json(path: &Path, content: &str) -> Result<Value, MessageError> {
    info!("Parsing JSON into untyped structure");
    serde_json::from_str::<Value>(content).map_err(|err| {
        warn!("Message at {} is not JSON: {}", path.display(), err);
        MessageError::JSONDecodeError
    })
}

fn validate(schema: &JSONSchema, json: &Value) -> bool {
    info!("Validating raw message against JSON schema");
    match schema.validate(json) {
        Ok(_) => {
            info!("Message is valid");
            true
        }
        Err(_) => {
            warn!("Message fails validation");
            false
        }
    }
}

/// Final check before ingestion: valid JSON must also deserialise into the
/// typed job request that staging works with later
fn deserialise(json: Value) -> bool {
    info!("Deserialising valid JSON into typed Rust object");
    match serde_json::from_value::<JobRequest>(json) {
        Ok(_) => true,
        Err(err) => {
            warn!("Message can't be deserialised: {}", err);
            false
        }
    }
}
