// ABOUTME: HTTP client for the privacy pipeline API
// ABOUTME: Handles project lookup, connection updates, job queueing and job-run status

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

use super::models::{
    ConnectionUpdate, JobRequest, JobRun, JobRunList, JobRunQuery, JobRunResponse,
    JobRunSummary, PostgresConnection, Project, ProjectResponse, QueueProject,
};
use crate::auth::AccessToken;

/// The remote operations the job-run lifecycle depends on.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    async fn get_project(&self, project_id: &str) -> Result<Project>;

    async fn update_connection(
        &self,
        connection_id: &str,
        connection: &PostgresConnection,
    ) -> Result<()>;

    async fn enqueue_job(&self, job: &QueueProject) -> Result<()>;

    async fn list_job_runs(&self, query: &JobRunQuery) -> Result<Vec<JobRunSummary>>;

    async fn get_job_run(&self, job_run_id: &str) -> Result<JobRun>;
}

/// Where to reach the API and who to act as. Passed explicitly to the client
/// instead of living in shared process state.
#[derive(Debug, Clone)]
pub struct ApiContext {
    pub base_url: String,
    pub token: AccessToken,
}

pub struct RemoteClient {
    client: Client,
    context: ApiContext,
}

impl RemoteClient {
    pub fn new(context: ApiContext) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, context })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.context.base_url.trim_end_matches('/'), path)
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} failed with status {}: {}", action, status, body);
        }
        Ok(response)
    }
}

#[async_trait]
impl PipelineApi for RemoteClient {
    async fn get_project(&self, project_id: &str) -> Result<Project> {
        let url = self.url(&format!("/v1/projects/{}", project_id));

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.context.token.secret())
            .send()
            .await
            .context("Failed to fetch project from the pipeline API")?;
        let response = Self::check(response, "Project lookup").await?;

        let parsed: ProjectResponse = response
            .json()
            .await
            .context("Failed to parse project response")?;

        Ok(parsed.project)
    }

    async fn update_connection(
        &self,
        connection_id: &str,
        connection: &PostgresConnection,
    ) -> Result<()> {
        let url = self.url(&format!("/v1/connections/{}", connection_id));
        let body = ConnectionUpdate {
            connection: connection.clone(),
        };

        let response = self
            .client
            .put(&url)
            .bearer_auth(self.context.token.secret())
            .json(&body)
            .send()
            .await
            .context("Failed to send connection update to the pipeline API")?;
        Self::check(response, "Connection update").await?;

        Ok(())
    }

    async fn enqueue_job(&self, job: &QueueProject) -> Result<()> {
        let url = self.url("/v1/jobs/queue");
        let body = JobRequest { job: job.clone() };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.context.token.secret())
            .json(&body)
            .send()
            .await
            .context("Failed to queue job with the pipeline API")?;
        Self::check(response, "Job submission").await?;

        Ok(())
    }

    async fn list_job_runs(&self, query: &JobRunQuery) -> Result<Vec<JobRunSummary>> {
        let url = self.url("/v1/job-runs");

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.context.token.secret())
            .query(query)
            .send()
            .await
            .context("Failed to list job runs from the pipeline API")?;
        let response = Self::check(response, "Job run listing").await?;

        let parsed: JobRunList = response
            .json()
            .await
            .context("Failed to parse job run listing")?;

        Ok(parsed.job_runs)
    }

    async fn get_job_run(&self, job_run_id: &str) -> Result<JobRun> {
        let url = self.url(&format!("/v1/job-runs/{}", job_run_id));

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.context.token.secret())
            .send()
            .await
            .context("Failed to get job run status. The pipeline API may be unavailable")?;
        let response = Self::check(response, "Job run status").await?;

        let parsed: JobRunResponse = response
            .json()
            .await
            .context("Failed to parse job run status")?;

        Ok(parsed.job_run)
    }
}
