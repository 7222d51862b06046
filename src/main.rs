// ABOUTME: Entry point for the privacy pipeline job runner
// ABOUTME: Parses inputs, runs the job-run lifecycle and reports the outcome to CI

use clap::Parser;
use std::process::ExitCode;

use privacy_job_runner::auth::OAuthClient;
use privacy_job_runner::config::Config;
use privacy_job_runner::{execute, logging, report};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    report::mask_secrets(&config.secrets());
    logging::init(&config.log_level);

    let credentials = match OAuthClient::new() {
        Ok(credentials) => credentials,
        Err(e) => return report::outcome(Err(e)),
    };

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        tracing::warn!("Interrupt received, abandoning the wait");
    };

    report::outcome(execute(&config, &credentials, cancel).await)
}
