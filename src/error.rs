// ABOUTME: Error taxonomy for the job-run lifecycle
// ABOUTME: Each variant names the step that failed and carries an actionable message

use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum LifecycleError {
    Auth(String),
    Lookup {
        project_id: String,
        reason: String,
    },
    Update {
        connection_id: String,
        reason: String,
    },
    Enqueue {
        project_id: String,
        reason: String,
    },
    Discovery {
        project_id: String,
        reason: String,
    },
    PollTransport {
        run_id: String,
        attempts: u32,
        reason: String,
    },
    TerminalFailure {
        run_id: String,
        status: String,
    },
    Timeout {
        run_id: String,
        polls: u32,
        waited: Duration,
    },
    Cancelled {
        run_id: String,
    },
}

impl LifecycleError {
    /// Flattens an `anyhow` chain into a single line for the variant payloads.
    pub(crate) fn reason(err: &anyhow::Error) -> String {
        format!("{:#}", err)
    }
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LifecycleError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            LifecycleError::Lookup { project_id, reason } => {
                write!(f, "Failed to look up project {}: {}", project_id, reason)
            }
            LifecycleError::Update {
                connection_id,
                reason,
            } => write!(
                f,
                "Failed to update destination connection {}: {}. No job was started",
                connection_id, reason
            ),
            LifecycleError::Enqueue { project_id, reason } => {
                write!(f, "Failed to queue job for project {}: {}", project_id, reason)
            }
            LifecycleError::Discovery { project_id, reason } => write!(
                f,
                "Could not find the job run started for project {}: {}",
                project_id, reason
            ),
            LifecycleError::PollTransport {
                run_id,
                attempts,
                reason,
            } => write!(
                f,
                "Failed to fetch status of job run {} after {} attempt(s): {}",
                run_id, attempts, reason
            ),
            LifecycleError::TerminalFailure { run_id, status } => {
                write!(f, "Unable to complete job {} with status {}", run_id, status)
            }
            LifecycleError::Timeout {
                run_id,
                polls,
                waited,
            } => write!(
                f,
                "Timed out waiting for job run {} after {} poll(s) over {}s",
                run_id,
                polls,
                waited.as_secs()
            ),
            LifecycleError::Cancelled { run_id } => {
                write!(f, "Cancelled while waiting for job run {}", run_id)
            }
        }
    }
}

impl std::error::Error for LifecycleError {}
