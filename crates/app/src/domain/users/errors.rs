//! Users service errors.

use thiserror::Error;

use crate::domain::users::store::StoreError;

/// Errors returned by the users service.
#[derive(Debug, Error)]
pub enum UsersServiceError {
    /// The caller passed a malformed required value.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No user has the requested id.
    #[error("user not found")]
    NotFound,

    /// A user with the same id already exists, whether found by the pre-check or rejected by the
    /// store's unique key.
    #[error("user already registered")]
    DuplicateKey,

    /// The store rejected the row for a reason the service did not check beforehand.
    #[error("storage constraint violated: {0}")]
    ConstraintViolation(String),

    /// The store failed for a reason unrelated to the submitted values.
    #[error("storage error")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for UsersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::UniqueViolation(_) => Self::DuplicateKey,
            StoreError::Constraint(detail) => Self::ConstraintViolation(detail),
            StoreError::Sql(_) => Self::Storage(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_is_a_duplicate_key() {
        let error = UsersServiceError::from(StoreError::UniqueViolation("users_pkey".to_string()));

        assert!(matches!(error, UsersServiceError::DuplicateKey));
    }

    #[test]
    fn other_constraints_keep_their_detail() {
        let error = UsersServiceError::from(StoreError::Constraint("too long".to_string()));

        assert!(
            matches!(&error, UsersServiceError::ConstraintViolation(detail) if detail == "too long"),
            "unexpected {error:?}"
        );
    }

    #[test]
    fn driver_failures_are_storage_errors() {
        let error = UsersServiceError::from(StoreError::Sql(sqlx::Error::PoolTimedOut));

        assert!(matches!(error, UsersServiceError::Storage(_)));
    }
}
