use anyhow::Result;
use log::info;
use rusqlite::Connection;

use crate::request::message::Message;

/// Load a Message into the database
///
/// The message is stored in a JSON column and the schema will automatically
/// extract the figure job ID and add an insertion timestamp
pub fn ingest_message(conn: &Connection, message: &Message) -> Result<()> {
    info!("Adding {} to db", &message.key);
    let json = &message.content;
    let valid = &message.valid;

    conn.execute(
        "INSERT INTO job (manifest, valid) VALUES (?1, ?2)",
        (json, valid),
    )?;

    Ok(())
}
