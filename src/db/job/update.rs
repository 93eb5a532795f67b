use std::process::Command;
use log::info;
use rusqlite::Connection;

use crate::db::job::state::JobState;
use crate::slurm::job::JobPath;
use crate::slurm::job_request::JobRequest;

impl JobRequest {
    pub fn stage(&self, conn: &Connection) {
        let state = JobState::Staged;
        self.update(conn, state);
    }

    pub fn submit(&self, conn: &Connection, job: JobPath) {
        let job_id = self.run_sbatch(job);
        info!("SLURM job id: {job_id}");
        let state = JobState::Submitted;
        self.update(conn, state);
        self.update_slurm(conn, job_id).expect("update OK");
    }

    fn update_slurm(&self, conn: &Connection, slurm_id: String) -> rusqlite::Result<()> {
        let id = &self.figure_job.id;
        info!("Updating {id} with slurm ID {slurm_id}");
        conn.execute(
            "UPDATE job SET slurm_id = ?1 WHERE fig_id = ?2",
            (slurm_id.as_str(), id.as_str()),
        )?;

        Ok(())
    }

    fn update(&self, conn: &Connection, state: JobState) {
        let id = &self.figure_job.id;
        let col = state.to_string();
        info!("Updating {id} with state {col}");
        let stmt = format!("UPDATE job SET {col} = 1 WHERE fig_id = (?1)");

        conn.execute(
            &stmt,
            (id.as_str(),),
        ).expect("Update job state");
    }

    /// Submit the rendered job script and capture the scheduler's job id.
    ///
    /// --parsable makes sbatch print the bare job id (with a trailing
    /// newline) instead of "Submitted batch job N"
    fn run_sbatch(&self, job_path: JobPath) -> String {
        let job_script_path = job_path.path.to_str().expect("Job script path");
        let arguments = vec!["--parsable", job_script_path];

        let mut sbatch = Command::new("sbatch");
        let cmd = sbatch.args(&arguments);
        info!("Running sbatch process");
        info!("{:?}", &cmd);
        let output = cmd.output().expect("failed to execute process").stdout;

        String::from_utf8(output).expect("job id").trim().to_string()
    }
}
