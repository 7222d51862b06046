// ABOUTME: Reports outcome back to the invoking CI environment
// ABOUTME: Emits GitHub workflow commands for secret masking and step failure

use std::process::ExitCode;

use crate::pipeline::RunReport;

pub fn is_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS")
        .map(|v| v == "true")
        .unwrap_or(false)
}

/// Workflow command data must escape `%`, CR and LF.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

pub fn mask_command(secret: &str) -> Option<String> {
    if secret.is_empty() {
        return None;
    }
    Some(format!("::add-mask::{}", escape_data(secret)))
}

pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Registers secrets with the runner so they are scrubbed from the job log.
pub fn mask_secrets(secrets: &[&str]) {
    if !is_github_actions() {
        return;
    }
    for command in secrets.iter().filter_map(|s| mask_command(s)) {
        println!("{}", command);
    }
}

/// The `::error::` line that marks the step failed, if the run did not succeed.
pub fn failure_line(result: &anyhow::Result<RunReport>) -> Option<String> {
    result
        .as_ref()
        .err()
        .map(|e| error_command(&format!("{:#}", e)))
}

/// Maps the lifecycle result to the process exit code. Only a successful run exits 0.
pub fn outcome(result: anyhow::Result<RunReport>) -> ExitCode {
    if let Some(line) = failure_line(&result) {
        println!("{}", line);
        return ExitCode::FAILURE;
    }
    if let Ok(run) = &result {
        tracing::info!("Done: job run {} succeeded after {} poll(s)", run.run_id, run.polls);
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LifecycleError;
    use crate::pipeline::RunStatus;

    #[test]
    fn error_command_escapes_newlines() {
        assert_eq!(
            error_command("Unable to complete job r9 with status FAILED\n100% done"),
            "::error::Unable to complete job r9 with status FAILED%0A100%25 done"
        );
    }

    fn code(result: anyhow::Result<RunReport>) -> String {
        format!("{:?}", outcome(result))
    }

    #[test]
    fn failed_run_exits_nonzero_with_run_and_status() {
        let result: anyhow::Result<RunReport> = Err(LifecycleError::TerminalFailure {
            run_id: "r9".to_string(),
            status: "FAILED".to_string(),
        }
        .into());

        assert_eq!(
            failure_line(&result).as_deref(),
            Some("::error::Unable to complete job r9 with status FAILED")
        );
        assert_eq!(code(result), format!("{:?}", ExitCode::FAILURE));
    }

    #[test]
    fn successful_run_exits_zero() {
        let result = Ok(RunReport {
            run_id: "r9".to_string(),
            polls: 3,
            status: RunStatus::Success,
        });

        assert_eq!(failure_line(&result), None);
        assert_eq!(code(result), format!("{:?}", ExitCode::SUCCESS));
    }

    #[test]
    fn setup_failure_exits_nonzero() {
        let result: anyhow::Result<RunReport> =
            Err(anyhow::anyhow!("connection refused").context("Failed to create HTTP client"));

        assert_eq!(
            failure_line(&result).as_deref(),
            Some("::error::Failed to create HTTP client: connection refused")
        );
        assert_eq!(code(result), format!("{:?}", ExitCode::FAILURE));
    }

    #[test]
    fn empty_secret_is_not_masked() {
        assert_eq!(mask_command(""), None);
        assert_eq!(mask_command("pw").as_deref(), Some("::add-mask::pw"));
    }
}
