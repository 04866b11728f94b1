//! User Workflow Errors

use salvo::http::StatusError;
use thiserror::Error;
use tracing::error;

use roster_app::domain::users::UsersServiceError;

/// Failures a workflow step cannot turn into a view.
#[derive(Debug, Error)]
pub(crate) enum WorkflowError {
    #[error("users service failed: {0}")]
    Service(#[from] UsersServiceError),

    #[error("failed to build view model: {0}")]
    Model(#[from] serde_json::Error),
}

pub(crate) fn into_status_error(error: WorkflowError) -> StatusError {
    match error {
        WorkflowError::Service(UsersServiceError::InvalidArgument(reason)) => {
            error!("user workflow called with invalid argument: {reason}");
        }
        WorkflowError::Service(UsersServiceError::Storage(source)) => {
            error!("user storage failed: {source}");
        }
        other => error!("user workflow failed: {other}"),
    }

    StatusError::internal_server_error()
}
