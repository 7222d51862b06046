// ABOUTME: Invocation options for the runner
// ABOUTME: Reads flags or GitHub Action style INPUT_* environment variables

use clap::Parser;
use std::time::Duration;

use crate::pipeline::{DbParams, PollPolicy, RunRequest};

pub const DEFAULT_OAUTH_DOMAIN: &str = "auth.privacydynamics.io";
pub const DEFAULT_API_URL: &str = "https://api.privacydynamics.io";

#[derive(Parser, Clone)]
#[command(
    name = "privacy-job-runner",
    version,
    about = "Repoint a project's destination database, run it and wait for the result"
)]
pub struct Config {
    /// Project to reconfigure and run
    #[arg(long, env = "INPUT_PROJECT-ID", value_parser = non_empty)]
    pub project_id: String,

    /// Destination database host
    #[arg(long, env = "INPUT_DB-HOST", value_parser = non_empty)]
    pub db_host: String,

    /// Destination database port
    #[arg(long, env = "INPUT_DB-PORT")]
    pub db_port: u16,

    /// Destination database user
    #[arg(long, env = "INPUT_DB-USERNAME", value_parser = non_empty)]
    pub db_username: String,

    /// Destination database password
    #[arg(long, env = "INPUT_DB-PASSWORD", hide_env_values = true)]
    pub db_password: String,

    /// OAuth client id for the token exchange
    #[arg(long, env = "INPUT_CLIENT-ID", value_parser = non_empty)]
    pub client_id: String,

    /// OAuth client secret for the token exchange
    #[arg(long, env = "INPUT_CLIENT-SECRET", hide_env_values = true, value_parser = non_empty)]
    pub client_secret: String,

    /// Host serving the OAuth token endpoint
    #[arg(long, env = "INPUT_OAUTH-DOMAIN", default_value = DEFAULT_OAUTH_DOMAIN)]
    pub oauth_domain: String,

    /// Base URL of the pipeline API
    #[arg(long, env = "INPUT_API-URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Seconds between job run status checks
    #[arg(
        long,
        env = "INPUT_POLL-INTERVAL-SECS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,

    /// Give up after waiting this many seconds for the run (default: wait indefinitely)
    #[arg(long, env = "INPUT_MAX-WAIT-SECS")]
    pub max_wait_secs: Option<u64>,

    /// Give up after this many status checks (default: unlimited)
    #[arg(long, env = "INPUT_MAX-POLLS")]
    pub max_polls: Option<u32>,

    /// Consecutive failed status checks tolerated before giving up
    #[arg(long, env = "INPUT_POLL-RETRIES", default_value_t = 3)]
    pub poll_retries: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "INPUT_LOG-LEVEL", default_value = "info")]
    pub log_level: String,
}

fn non_empty(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

impl Config {
    pub fn run_request(&self) -> RunRequest {
        RunRequest {
            project_id: self.project_id.clone(),
            db: DbParams {
                host: self.db_host.clone(),
                port: self.db_port,
                username: self.db_username.clone(),
                password: self.db_password.clone(),
            },
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: self.max_wait_secs.map(Duration::from_secs),
            max_polls: self.max_polls,
            transport_retries: self.poll_retries,
        }
    }

    /// Values that must never show up in CI logs.
    pub fn secrets(&self) -> Vec<&str> {
        vec![self.db_password.as_str(), self.client_secret.as_str()]
    }
}
