use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct JobRequest {
    pub figure_job: FigureJob,
    pub environment: EnvironmentSpec,
    pub payload: PayloadSpec,
}

/// Scheduler-facing description of one figure generation job
#[derive(Debug, Deserialize, Serialize)]
pub struct FigureJob {
    pub id: String,
    pub resources: ResourceRequest,
    pub notify: NotifySpec,
    pub workdir: String,
    pub logs: Option<LogPaths>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResourceRequest {
    pub partition: String,
    pub cpus_per_task: u32,
    pub memory: String,
    pub time_limit: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NotifySpec {
    pub mail_user: String,
    pub mail_events: Vec<MailEvent>,
}

/// Job states the scheduler mails the user about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailEvent {
    Begin,
    End,
    Fail,
    All,
}

/// Scheduler log destinations, may contain the %j job id token which SLURM
/// substitutes at runtime
#[derive(Debug, Deserialize, Serialize)]
pub struct LogPaths {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EnvironmentSpec {
    pub setup_script: String,
    pub env_name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PayloadSpec {
    pub program: String,
}
