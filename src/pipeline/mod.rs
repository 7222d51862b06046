// ABOUTME: Job-run lifecycle for a project
// ABOUTME: Reconciles the destination connection, launches a run and waits for it to finish

pub mod launch;
pub mod monitor;
pub mod reconcile;

use std::future::Future;

use crate::error::LifecycleError;
use crate::remote::PipelineApi;

pub use launch::launch_job;
pub use monitor::{classify, wait_for_run, MonitorState, PollPolicy, RunReport, RunStatus};
pub use reconcile::{desired_connection, reconcile_connection, DbParams, ReconciledConnection};

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub project_id: String,
    pub db: DbParams,
}

/// Runs the whole lifecycle against an authenticated client. Any step failing
/// stops the chain; a run is only launched once the connection update succeeded.
pub async fn run_job<F>(
    api: &dyn PipelineApi,
    request: &RunRequest,
    policy: &PollPolicy,
    cancel: F,
) -> Result<RunReport, LifecycleError>
where
    F: Future<Output = ()>,
{
    let reconciled = reconcile_connection(api, &request.project_id, &request.db).await?;

    tracing::info!(
        "Start new job run on connection {}",
        reconciled.connection_id
    );
    let run_id = launch_job(api, &request.project_id).await?;

    wait_for_run(api, &run_id, policy, cancel).await
}
