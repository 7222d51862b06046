// ABOUTME: Job run monitor that polls status until the run reaches a terminal state
// ABOUTME: Classifies remote statuses and applies the wait, retry, deadline and cancel policy

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::LifecycleError;
use crate::remote::PipelineApi;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TRANSPORT_RETRIES: u32 = 3;

/// Status vocabulary reported by the pipeline for a job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Sent,
    Started,
    InProgress,
    Retry,
    Pending,
    Success,
    /// Anything else the API reports. Treated as a failed run.
    Other(String),
}

impl RunStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "SENT" => RunStatus::Sent,
            "STARTED" => RunStatus::Started,
            "IN PROGRESS" => RunStatus::InProgress,
            "RETRY" => RunStatus::Retry,
            "PENDING" => RunStatus::Pending,
            "SUCCESS" => RunStatus::Success,
            other => RunStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Sent => "SENT",
            RunStatus::Started => "STARTED",
            RunStatus::InProgress => "IN PROGRESS",
            RunStatus::Retry => "RETRY",
            RunStatus::Pending => "PENDING",
            RunStatus::Success => "SUCCESS",
            RunStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the wait loop stands after a poll. Running out of time is decided by
/// the poll policy, not by status, and surfaces as `LifecycleError::Timeout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorState {
    PendingTerminal,
    TerminalSuccess,
    TerminalFailure(String),
}

/// Maps a polled status to the next state. Only the listed in-flight statuses
/// keep the loop going, so unknown statuses end it as failures.
pub fn classify(status: &RunStatus) -> MonitorState {
    match status {
        RunStatus::Sent
        | RunStatus::Started
        | RunStatus::InProgress
        | RunStatus::Retry
        | RunStatus::Pending => MonitorState::PendingTerminal,
        RunStatus::Success => MonitorState::TerminalSuccess,
        RunStatus::Other(s) => MonitorState::TerminalFailure(s.clone()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Total time to keep waiting. `None` waits until the run finishes.
    pub max_wait: Option<Duration>,
    pub max_polls: Option<u32>,
    /// Consecutive failed status fetches tolerated before giving up.
    pub transport_retries: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
            max_polls: None,
            transport_retries: DEFAULT_TRANSPORT_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: String,
    pub polls: u32,
    pub status: RunStatus,
}

/// Polls `run_id` until it succeeds, fails, runs out of time or `cancel` resolves.
///
/// Status fetches are strictly sequential with `policy.interval` between the end
/// of one fetch and the start of the next. `cancel` is only observed while
/// waiting between polls.
pub async fn wait_for_run<F>(
    api: &dyn PipelineApi,
    run_id: &str,
    policy: &PollPolicy,
    cancel: F,
) -> Result<RunReport, LifecycleError>
where
    F: Future<Output = ()>,
{
    tokio::pin!(cancel);

    let started = Instant::now();
    let mut polls = 0u32;
    let mut failed_fetches = 0u32;

    loop {
        polls += 1;
        match api.get_job_run(run_id).await {
            Ok(run) => {
                failed_fetches = 0;
                let status = RunStatus::parse(&run.status);
                match classify(&status) {
                    MonitorState::TerminalSuccess => {
                        tracing::info!("Job run {} finished with status {}", run_id, status);
                        return Ok(RunReport {
                            run_id: run_id.to_string(),
                            polls,
                            status,
                        });
                    }
                    MonitorState::TerminalFailure(status) => {
                        return Err(LifecycleError::TerminalFailure {
                            run_id: run_id.to_string(),
                            status,
                        });
                    }
                    MonitorState::PendingTerminal => {
                        tracing::info!("Job run {} is {}. Not done", run_id, status);
                    }
                }
            }
            Err(e) => {
                failed_fetches += 1;
                if failed_fetches > policy.transport_retries {
                    return Err(LifecycleError::PollTransport {
                        run_id: run_id.to_string(),
                        attempts: failed_fetches,
                        reason: LifecycleError::reason(&e),
                    });
                }
                tracing::warn!(
                    "Status fetch for job run {} failed ({}/{} retries): {:#}",
                    run_id,
                    failed_fetches,
                    policy.transport_retries,
                    e
                );
            }
        }

        let delay = match next_delay(policy, polls, started.elapsed()) {
            Some(delay) => delay,
            None => {
                return Err(LifecycleError::Timeout {
                    run_id: run_id.to_string(),
                    polls,
                    waited: started.elapsed(),
                });
            }
        };

        tracing::info!("Waiting {} seconds...", delay.as_secs_f64());
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = &mut cancel => {
                return Err(LifecycleError::Cancelled {
                    run_id: run_id.to_string(),
                });
            }
        }
    }
}

/// How long to wait before the next poll, or `None` once the policy's bounds are spent.
/// The last wait is shortened so the final poll lands on the deadline.
fn next_delay(policy: &PollPolicy, polls: u32, elapsed: Duration) -> Option<Duration> {
    if matches!(policy.max_polls, Some(max) if polls >= max) {
        return None;
    }
    match policy.max_wait {
        Some(max_wait) if elapsed >= max_wait => None,
        Some(max_wait) => Some(policy.interval.min(max_wait - elapsed)),
        None => Some(policy.interval),
    }
}
