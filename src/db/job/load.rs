use log::info;
use rusqlite::Connection;
use serde_json::Result as JsonResult;

use crate::slurm::job_request::JobRequest;

/// Load jobs that are valid but not yet staged or submitted.
///
/// Returns None when there's nothing to submit. Also settles the fate of the
/// dry run save point opened by open_db: released on a real run, rolled back
/// on a dry run so ingested messages leave no trace.
pub fn get_valid_jobs(conn: &Connection, dry_run: bool) -> Option<Vec<JobRequest>> {
    let mut stmt = conn
        .prepare("SELECT fig_id, manifest FROM job WHERE valid == 1 AND staged == 0 AND submitted == 0")
        .expect("Prepared statement");
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .expect("Query");

    let mut json: Vec<String> = Vec::new();
    for row in rows {
        let (fig_id, json_string) = row.expect("Row");
        info!("Loading valid job from db: {fig_id}");
        json.push(json_string);
    }

    release_or_rollback(conn, dry_run);

    let jobs = deserialise(json).expect("Deserialised JSON");
    match jobs.is_empty() {
        true => { None }
        false => { Some(jobs) }
    }
}

fn deserialise(json_strings: Vec<String>) -> JsonResult<Vec<JobRequest>> {
    let mut jobs: Vec<JobRequest> = Vec::new();
    for string in json_strings {
        let job: JobRequest = serde_json::from_str(&string)?;
        jobs.push(job);
    }
    Ok(jobs)
}

fn release_or_rollback(conn: &Connection, dry_run: bool) {
    match dry_run {
        true => {
            info!("--dry-run set, rolling back database state");
            conn.execute("ROLLBACK TO dry_run", []).expect("rollback");
        }
        false => {
            info!("--dry-run not set, releasing dry run save point");
            conn.execute("RELEASE dry_run", []).expect("release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::ingest::message::ingest_message;
    use crate::db::open::open_db;
    use crate::request::message::Message;
    use crate::WorkingDirectory;

    static REQUEST: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/example_request.json"));

    fn ingested_db(valid: bool) -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().expect("temp dir");
        let wd = WorkingDirectory { path: dir.path().to_path_buf() };
        let conn = open_db(&wd).expect("open db");

        let message = Message {
            key: "core50-figures".to_string(),
            content: REQUEST.to_string(),
            valid,
        };
        ingest_message(&conn, &message).expect("ingest");

        (dir, conn)
    }

    #[test]
    fn valid_jobs_are_loaded_and_typed() {
        let (_dir, conn) = ingested_db(true);

        let jobs = get_valid_jobs(&conn, false).expect("one job");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].figure_job.id, "core50-figures");
        assert_eq!(jobs[0].figure_job.resources.cpus_per_task, 16);
    }

    #[test]
    fn invalid_jobs_are_not_loaded() {
        let (_dir, conn) = ingested_db(false);
        assert!(get_valid_jobs(&conn, false).is_none());
    }

    #[test]
    fn staged_jobs_are_not_reloaded() {
        let (_dir, conn) = ingested_db(true);

        let jobs = get_valid_jobs(&conn, false).expect("one job");
        jobs[0].stage(&conn);

        conn.execute("SAVEPOINT dry_run", []).expect("savepoint");
        assert!(get_valid_jobs(&conn, false).is_none());
    }

    #[test]
    fn dry_run_rolls_ingested_messages_back() {
        let (_dir, conn) = ingested_db(true);

        let jobs = get_valid_jobs(&conn, true).expect("job still reported");
        assert_eq!(jobs.len(), 1);

        // the rollback dropped the row, so a fresh load finds nothing
        conn.execute("SAVEPOINT dry_run", []).expect("savepoint");
        assert!(get_valid_jobs(&conn, false).is_none());
    }
}
