use clap::Args;
use roster::users::UserId;
use roster_app::domain::users::UsersService;

#[derive(Debug, Args)]
pub(crate) struct ShowUserArgs {
    /// User id
    id: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ShowUserArgs) -> Result<(), String> {
    let service = crate::cli::users_service(&args.database_url).await?;

    let user = service
        .get_user(UserId::new(args.id))
        .await
        .map_err(|error| format!("failed to fetch user: {error}"))?;

    super::print_user(&user);

    Ok(())
}
