// ABOUTME: Library root for the privacy pipeline job runner
// ABOUTME: Exposes configuration, the remote client and the job-run lifecycle

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod remote;
pub mod report;

use auth::{authenticate, CredentialProvider};
use config::Config;
use pipeline::RunReport;
use remote::{ApiContext, RemoteClient};
use std::future::Future;

/// Authenticates, builds the API client and drives the lifecycle to a terminal outcome.
pub async fn execute<F>(
    config: &Config,
    credentials: &dyn CredentialProvider,
    cancel: F,
) -> anyhow::Result<RunReport>
where
    F: Future<Output = ()>,
{
    let token = authenticate(
        credentials,
        &config.oauth_domain,
        &config.client_id,
        &config.client_secret,
    )
    .await?;
    report::mask_secrets(&[token.secret()]);

    let client = RemoteClient::new(ApiContext {
        base_url: config.api_url.clone(),
        token,
    })?;

    let report =
        pipeline::run_job(&client, &config.run_request(), &config.poll_policy(), cancel).await?;
    Ok(report)
}
