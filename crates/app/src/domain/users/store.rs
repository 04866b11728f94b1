//! Users Store
//!
//! The persistence contract the users service is written against. A store hands out
//! transactions; every read and write of one service call goes through a single transaction, which
//! rolls back if it is dropped without [`UsersTransaction::commit`].

use async_trait::async_trait;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use roster::users::{User, UserFilter, UserId};

mod memory;
mod postgres;

pub use memory::MemoryUsersStore;
pub use postgres::PgUsersStore;

/// Errors raised by a users store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with the same primary key already exists.
    #[error("unique key violated: {0}")]
    UniqueViolation(String),

    /// The row breaks a column or table constraint other than the primary key.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// The store failed for a reason unrelated to the row's contents.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        let Some(database_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        let message = database_error.message().to_string();

        match database_error.kind() {
            ErrorKind::UniqueViolation => Self::UniqueViolation(message),
            ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation
            | ErrorKind::ForeignKeyViolation => Self::Constraint(message),
            _ if is_data_exception(database_error) => Self::Constraint(message),
            _ => Self::Sql(error),
        }
    }
}

/// SQLSTATE class 22 covers values the column cannot hold, such as an overlong string.
fn is_data_exception(error: &dyn DatabaseError) -> bool {
    error.code().is_some_and(|code| code.starts_with("22"))
}

/// Source of users transactions.
#[async_trait]
pub trait UsersStore: Send + Sync {
    /// Begin a transaction.
    async fn begin(&self) -> Result<Box<dyn UsersTransaction>, StoreError>;
}

/// Reads and writes against the users table inside one transaction.
#[async_trait]
pub trait UsersTransaction: Send {
    /// Fetch the user with the given id.
    async fn select_by_key(&mut self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Fetch every user matching `filter`, ordered by id.
    async fn select_by_filter(&mut self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;

    /// Insert a new row. Returns the number of rows written.
    async fn insert(&mut self, user: &User) -> Result<u64, StoreError>;

    /// Overwrite every mutable column of the row with `user.id`. The creation time is left alone.
    /// Returns the number of rows written.
    async fn update_by_key(&mut self, user: &User) -> Result<u64, StoreError>;

    /// Delete the row with the given id. Returns the number of rows removed.
    async fn delete_by_key(&mut self, id: &UserId) -> Result<u64, StoreError>;

    /// Make the transaction's writes durable.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
