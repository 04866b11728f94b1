use clap::Args;
use roster::users::UserId;
use roster_app::domain::users::UsersService;

#[derive(Debug, Args)]
pub(crate) struct DeleteUserArgs {
    /// User id
    id: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: DeleteUserArgs) -> Result<(), String> {
    let service = crate::cli::users_service(&args.database_url).await?;

    service
        .delete_user(UserId::new(args.id.clone()))
        .await
        .map_err(|error| format!("failed to delete user: {error}"))?;

    println!("deleted user: {}", args.id);

    Ok(())
}
