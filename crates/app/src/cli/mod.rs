use std::sync::Arc;

use clap::{Parser, Subcommand};
use roster_app::{
    database::{self, Db},
    domain::users::{StoreUsersService, store::PgUsersStore},
};

mod db;
mod user;

#[derive(Debug, Parser)]
#[command(name = "roster-app", about = "Roster CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(user::UserCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

/// Connect to the database and build a users service over it.
async fn users_service(database_url: &str) -> Result<StoreUsersService, String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(StoreUsersService::new(Arc::new(PgUsersStore::new(Db::new(
        pool,
    )))))
}
