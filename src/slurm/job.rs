use std::{fs, io};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use tinytemplate::{format_unescaped, TinyTemplate};

use crate::slurm::job_request::{EnvironmentSpec, FigureJob, JobRequest, MailEvent, PayloadSpec};
use crate::WorkingDirectory;

/// A JobPath is the path to a job script that's submitted to SLURM via sbatch
///
/// A JobPath has a `manifest.json` next to it: the original request the
/// script was rendered from, kept for provenance
pub struct JobPath {
    pub path: PathBuf,
}

impl JobRequest {
    pub fn create(&self, wd: &WorkingDirectory) -> JobPath {
        let instance_wd = WorkingDirectory { path: wd.path.join(&self.figure_job.id) };
        info!("Creating job {} in working directory {}", &self.figure_job.id, &instance_wd.path.display());

        if instance_wd.path.exists() {
            warn!("Job directory already exists, files will be overwritten");
            fs::remove_dir_all(&instance_wd.path).expect("Delete existing directory");
        }
        fs::create_dir(&instance_wd.path).expect("Create working directory");

        let header: Header = render_header(&self.figure_job);
        let environment: Environment = render_environment(&self.environment);
        let payload: Payload = render_payload(&self.payload);
        let job = JobTemplate { header, environment, payload };

        let path = instance_wd.path.join("job.sh");
        job.write(&path).expect("Can't write job script");
        write_manifest(self, &instance_wd);

        JobPath { path }
    }
}

/// All rendered data necessary to submit a figure generation job to SLURM
struct JobTemplate {
    header: Header,
    environment: Environment,
    payload: Payload,
}

impl JobTemplate {
    /// Write the complete job script to disk by appending rendered sections to the file
    fn write(self, out_path: &Path) -> Result<(), io::Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(out_path)?;

        // order is important when writing the file
        let contents = [
            self.header.content,
            self.environment.content,
            self.payload.content,
        ];

        for content in contents.iter() {
            file.write_all(content.as_bytes())?;
        }

        Ok(())
    }
}

/// Rendered SBATCH header
///
/// SLURM job options can be parsed by sbatch using #SBATCH directives [before
/// executable commands](https://slurm.schedmd.com/sbatch.html#SECTION_DESCRIPTION).
/// Every directive comes straight from the job request:
/// - partition
/// - cpus per task
/// - memory
/// - stdout / stderr paths (SLURM substitutes any %j token with the job id)
/// - wall clock limit
/// - job name
/// - mail user and mail type
/// - working directory
struct Header {
    content: String,
}

/// Rendered environment setup section
///
/// Sources the cluster setup script and activates the named conda
/// environment, in that order. The section begins with set -e so a failed
/// setup stops the job before the payload runs.
struct Environment {
    content: String,
}

/// Rendered payload invocation
///
/// One program, run with no arguments as the last command in the script, so
/// the job's exit status is the payload's exit status.
struct Payload {
    content: String,
}

/// Rendering context for header
#[derive(Serialize)]
struct HeaderContext {
    name: String,
    partition: String,
    cpus_per_task: u32,
    memory: String,
    stdout_path: String,
    stderr_path: String,
    time_limit: String,
    mail_user: String,
    mail_type: String,
    workdir: String,
    time_now: String,
}

/// Rendering context for environment setup
#[derive(Serialize)]
struct EnvContext {
    setup_script: String,
    env_name: String,
}

/// Rendering context for payload invocation
#[derive(Serialize)]
struct PayloadContext {
    program: String,
}

/// Render the SBATCH header using TinyTemplate
fn render_header(job: &FigureJob) -> Header {
    /// included header template
    static HEADER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/header.txt"));
    let tt = new_template("header", HEADER);

    let (stdout_path, stderr_path) = log_paths(job);
    let context = HeaderContext {
        name: job.id.clone(),
        partition: job.resources.partition.clone(),
        cpus_per_task: job.resources.cpus_per_task,
        memory: job.resources.memory.clone(),
        stdout_path,
        stderr_path,
        time_limit: job.resources.time_limit.clone(),
        mail_user: job.notify.mail_user.clone(),
        mail_type: format_mail_type(&job.notify.mail_events),
        workdir: job.workdir.clone(),
        time_now: Utc::now().to_string(),
    };

    Header { content: tt.render("header", &context).expect("Rendered header") }
}

/// Render the environment setup section using TinyTemplate
fn render_environment(environment: &EnvironmentSpec) -> Environment {
    /// included environment template
    static ENV: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/env.txt"));
    let tt = new_template("env", ENV);

    let context = EnvContext {
        setup_script: environment.setup_script.clone(),
        env_name: environment.env_name.clone(),
    };

    Environment { content: tt.render("env", &context).expect("Rendered environment") }
}

/// Render the payload invocation using TinyTemplate
fn render_payload(payload: &PayloadSpec) -> Payload {
    /// included payload template
    static PAYLOAD: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/payload.txt"));
    let tt = new_template("payload", PAYLOAD);

    let context = PayloadContext { program: payload.program.clone() };

    Payload { content: tt.render("payload", &context).expect("Rendered payload") }
}

/// Rendered output is a shell script, so the HTML escaping formatter is replaced
fn new_template(name: &'static str, text: &'static str) -> TinyTemplate<'static> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&format_unescaped);
    tt.add_template(name, text).expect("Template");
    tt
}

/// Scheduler log destinations, defaulted from the job id when the request
/// doesn't name them. %j is SLURM's job id substitution token and is passed
/// through untouched either way.
fn log_paths(job: &FigureJob) -> (String, String) {
    match &job.logs {
        Some(logs) => (logs.stdout.clone(), logs.stderr.clone()),
        None => (
            format!("{}_%j_stdout.txt", job.id),
            format!("{}_%j_stderr.txt", job.id),
        ),
    }
}

/// Format the mail event set the way sbatch expects it.
///
/// ALL dominates any other event, an empty set means no mail.
fn format_mail_type(events: &[MailEvent]) -> String {
    if events.is_empty() {
        return "NONE".to_string();
    }
    if events.contains(&MailEvent::All) {
        return "ALL".to_string();
    }

    events
        .iter()
        .map(|event| match event {
            MailEvent::Begin => "BEGIN",
            MailEvent::End => "END",
            MailEvent::Fail => "FAIL",
            MailEvent::All => "ALL",
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Write a copy of the original request next to the job script
fn write_manifest(request: &JobRequest, wd: &WorkingDirectory) {
    let manifest: String = serde_json::to_string_pretty(request).expect("Serialised request");
    let out_path = wd.path.join("manifest.json");
    info!("Writing manifest to {}", out_path.display());
    fs::write(out_path, manifest).expect("Can't write manifest");
}
