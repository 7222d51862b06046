// ABOUTME: Data structures exchanged with the privacy pipeline API
// ABOUTME: These are serialized to JSON for API communication

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectResponse {
    pub project: Project,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub destination_connection: DestinationConnection,
}

/// The project's reference to where processed data is written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DestinationConnection {
    pub connection_id: String,
    pub connection_name: String,
    pub database: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionUpdate {
    pub connection: PostgresConnection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostgresConnection {
    pub connection_name: String,
    pub database: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub input_type: String, // always "postgres"
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRequest {
    pub job: QueueProject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueProject {
    pub job_type: String, // "queue_project"
    pub project_id: String,
}

impl QueueProject {
    pub const JOB_TYPE: &'static str = "queue_project";

    pub fn new(project_id: &str) -> Self {
        Self {
            job_type: Self::JOB_TYPE.to_string(),
            project_id: project_id.to_string(),
        }
    }
}

/// Query for the job-run listing; the runner only ever asks for the newest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRunQuery {
    pub project_id: String,
    pub latest: bool,
    pub limit: u32,
    pub condensed: bool,
}

impl JobRunQuery {
    pub fn latest_for(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            latest: true,
            limit: 1,
            condensed: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobRunList {
    #[serde(default)]
    pub job_runs: Vec<JobRunSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobRunSummary {
    pub job_run_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobRunResponse {
    pub job_run: JobRun,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobRun {
    pub status: String, // "SENT", "STARTED", "IN PROGRESS", "RETRY", "PENDING", "SUCCESS", ...
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}
