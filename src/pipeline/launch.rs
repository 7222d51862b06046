// ABOUTME: Job launcher for project processing runs
// ABOUTME: Queues a queue_project job and resolves the job run it produced

use crate::error::LifecycleError;
use crate::remote::models::{JobRunQuery, QueueProject};
use crate::remote::PipelineApi;

/// Queues project processing and returns the id of the run to monitor.
///
/// The enqueue call does not return a run id, so the run is found by asking
/// for the newest run of the project right afterwards. If another job for the
/// same project is queued in between, that run may be picked up instead; callers
/// must not start concurrent runs for one project.
pub async fn launch_job(api: &dyn PipelineApi, project_id: &str) -> Result<String, LifecycleError> {
    let job = QueueProject::new(project_id);
    api.enqueue_job(&job)
        .await
        .map_err(|e| LifecycleError::Enqueue {
            project_id: project_id.to_string(),
            reason: LifecycleError::reason(&e),
        })?;

    let runs = api
        .list_job_runs(&JobRunQuery::latest_for(project_id))
        .await
        .map_err(|e| LifecycleError::Discovery {
            project_id: project_id.to_string(),
            reason: LifecycleError::reason(&e),
        })?;

    let run = runs.into_iter().next().ok_or_else(|| LifecycleError::Discovery {
        project_id: project_id.to_string(),
        reason: "no job runs listed after the job was queued".to_string(),
    })?;

    tracing::info!("Started job run {} for project {}", run.job_run_id, project_id);
    Ok(run.job_run_id)
}
