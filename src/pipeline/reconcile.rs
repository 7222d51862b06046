// ABOUTME: Destination connection reconciliation
// ABOUTME: Repoints a project's destination connection at new database network parameters

use std::fmt;

use crate::error::LifecycleError;
use crate::remote::models::{DestinationConnection, PostgresConnection};
use crate::remote::PipelineApi;

pub const POSTGRES_INPUT_TYPE: &str = "postgres";

/// Network location and credentials for the destination database.
#[derive(Clone, PartialEq, Eq)]
pub struct DbParams {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DbParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DbParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The connection that was submitted, along with the id it was submitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledConnection {
    pub connection_id: String,
    pub connection: PostgresConnection,
}

/// Keeps the connection's name and database, swaps in the new network parameters.
pub fn desired_connection(current: &DestinationConnection, params: &DbParams) -> PostgresConnection {
    PostgresConnection {
        connection_name: current.connection_name.clone(),
        database: current.database.clone(),
        host: params.host.clone(),
        port: params.port,
        username: params.username.clone(),
        password: params.password.clone(),
        input_type: POSTGRES_INPUT_TYPE.to_string(),
    }
}

pub async fn reconcile_connection(
    api: &dyn PipelineApi,
    project_id: &str,
    params: &DbParams,
) -> Result<ReconciledConnection, LifecycleError> {
    tracing::info!("Fetching metadata about project {}", project_id);
    let project = api
        .get_project(project_id)
        .await
        .map_err(|e| LifecycleError::Lookup {
            project_id: project_id.to_string(),
            reason: LifecycleError::reason(&e),
        })?;

    let current = project.destination_connection;
    let connection = desired_connection(&current, params);

    tracing::info!(
        "Update destination connection {} to: {}@{}:{}",
        current.connection_id,
        params.username,
        params.host,
        params.port
    );
    api.update_connection(&current.connection_id, &connection)
        .await
        .map_err(|e| LifecycleError::Update {
            connection_id: current.connection_id.clone(),
            reason: LifecycleError::reason(&e),
        })?;

    Ok(ReconciledConnection {
        connection_id: current.connection_id,
        connection,
    })
}
