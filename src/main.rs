use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use crate::db::ingest::message::ingest_message;
use crate::db::job::load::get_valid_jobs;
use crate::db::open::open_db;
use crate::namespace::PlatformNamespace;
use crate::request::message::Message;
use crate::request::read::get_message_paths;
use crate::request::schema::load_schema;

mod db;
mod namespace;
mod request;
mod slurm;

#[derive(Parser, Debug)]
#[command(name = "figbatch", version, about = "Render and submit figure generation jobs to SLURM")]
struct Args {
    /// Directory containing job request messages (one JSON file per job)
    #[arg(long)]
    message_dir: PathBuf,
    /// Directory containing the job request JSON schema (api.json)
    #[arg(long)]
    schema_dir: PathBuf,
    /// Working directory for rendered job scripts and the state database
    #[arg(long)]
    work_dir: PathBuf,
    /// Deployment namespace, keeps job state separate across environments
    #[arg(long, value_enum, default_value_t = PlatformNamespace::Dev)]
    namespace: PlatformNamespace,
    /// Render job scripts and roll back all database changes without running sbatch
    #[arg(long)]
    dry_run: bool,
}

/// Directory where all job state lives: the database and one subdirectory per staged job
pub struct WorkingDirectory {
    pub path: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    info!("starting figbatch");

    let args = Args::parse();
    info!("running in {} namespace", args.namespace);

    let wd = WorkingDirectory { path: args.work_dir.join(args.namespace.to_string()) };
    fs::create_dir_all(&wd.path)?;

    let conn = open_db(&wd)?;
    let schema = load_schema(&args.schema_dir);

    for path in get_message_paths(&args.message_dir)? {
        match Message::read(&path, &schema) {
            Ok(message) => ingest_message(&conn, &message)?,
            Err(err) => warn!("skipping message {}: {:?}", path.display(), err),
        }
    }

    let Some(jobs) = get_valid_jobs(&conn, args.dry_run) else {
        info!("no submittable jobs found, goodbye");
        return Ok(());
    };

    for job in jobs {
        let job_path = job.create(&wd);
        job.stage(&conn);
        match args.dry_run {
            true => info!("--dry-run set, not submitting {}", &job.figure_job.id),
            false => job.submit(&conn, job_path),
        }
    }

    info!("all jobs processed, goodbye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use crate::db::ingest::message::ingest_message;
    use crate::db::job::load::get_valid_jobs;
    use crate::db::open::open_db;
    use crate::request::message::Message;
    use crate::request::read::get_message_paths;
    use crate::request::schema::load_schema;
    use crate::WorkingDirectory;

    /// A message directory with one valid request ends up as a rendered job
    /// script on disk, ready for sbatch
    #[test]
    fn message_directory_stages_to_rendered_job_script() {
        let messages = tempfile::tempdir().expect("message dir");
        fs::write(
            messages.path().join("core50-figures.json"),
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/example_request.json")),
        )
        .expect("write message");

        let work = tempfile::tempdir().expect("work dir");
        let wd = WorkingDirectory { path: work.path().to_path_buf() };

        let conn = open_db(&wd).expect("db");
        let schema_dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data/schemas"));
        let schema = load_schema(&schema_dir);

        for path in get_message_paths(messages.path()).expect("messages") {
            let message = Message::read(&path, &schema).expect("readable message");
            ingest_message(&conn, &message).expect("ingest");
        }

        let jobs = get_valid_jobs(&conn, false).expect("one job");
        let job_path = jobs[0].create(&wd);
        jobs[0].stage(&conn);

        let script = fs::read_to_string(&job_path.path).expect("job script");
        assert!(script.starts_with("#!/bin/bash"));
        assert_eq!(script.matches("#SBATCH").count(), 10);
        assert!(script.contains("source /home/mlops/tf_setup.sh"));
        assert!(script.ends_with("python figure_generator.py\n"));
    }
}
