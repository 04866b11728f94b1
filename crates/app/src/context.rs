//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;
use tracing::info;

use crate::{
    database::{self, Db},
    domain::users::{
        StoreUsersService, UsersService,
        store::{MemoryUsersStore, PgUsersStore},
    },
};

/// Errors raised while building the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// Could not connect to the database.
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    /// A pending migration failed to apply.
    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),
}

/// Where users are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// PostgreSQL through sqlx
    Postgres,

    /// Process-local map, lost on restart
    Memory,
}

impl StorageKind {
    /// Label used in logs and the healthcheck.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::Postgres => "postgres",
            StorageKind::Memory => "memory",
        }
    }
}

/// Services shared by every request or command.
#[derive(Clone)]
pub struct AppContext {
    /// Users service
    pub users: Arc<dyn UsersService>,

    /// Backing store of the users service
    pub storage: StorageKind,
}

impl AppContext {
    /// Build application context from a database URL, applying pending migrations first when
    /// `run_migrations` is set.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_database_url(url: &str, run_migrations: bool) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;

            info!("database migrations applied");
        }

        let store = PgUsersStore::new(Db::new(pool));

        Ok(Self::from_users_service(
            Arc::new(StoreUsersService::new(Arc::new(store))),
            StorageKind::Postgres,
        ))
    }

    /// Build application context over a process-local store. Nothing survives a restart.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_users_service(
            Arc::new(StoreUsersService::new(Arc::new(MemoryUsersStore::new()))),
            StorageKind::Memory,
        )
    }

    /// Build application context around an existing users service.
    #[must_use]
    pub fn from_users_service(users: Arc<dyn UsersService>, storage: StorageKind) -> Self {
        Self { users, storage }
    }
}
