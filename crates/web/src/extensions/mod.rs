//! Handler extensions mapping internal failures to logged 500 responses.

use std::{any::Any, fmt::Display};

use salvo::prelude::{Depot, StatusError};
use tracing::error;

/// Typed depot lookups that fail as an internal server error.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>().map_err(|_missing| {
            error!("depot has no {} injected", std::any::type_name::<T>());

            StatusError::internal_server_error()
        })
    }
}

/// Response-building failures the client cannot act on.
pub(crate) trait ResultExt<T> {
    /// Log the error under `context` and answer 500.
    fn or_500(self, context: &str) -> Result<T, StatusError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|source| {
            error!("{context}: {source}");

            StatusError::internal_server_error()
        })
    }
}
