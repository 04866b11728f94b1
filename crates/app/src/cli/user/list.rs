use clap::Args;
use roster::users::UserFilter;
use roster_app::domain::users::UsersService;

#[derive(Debug, Args)]
pub(crate) struct ListUsersArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Only users whose id starts with this prefix
    #[arg(long)]
    id_prefix: Option<String>,

    /// Only users whose display name contains this text
    #[arg(long)]
    name: Option<String>,

    /// Only users with this active flag
    #[arg(long)]
    active: Option<bool>,
}

pub(crate) async fn run(args: ListUsersArgs) -> Result<(), String> {
    let service = crate::cli::users_service(&args.database_url).await?;

    let filter = UserFilter {
        id_prefix: args.id_prefix,
        name_contains: args.name,
        active: args.active,
    };

    let users = service
        .list_users(filter)
        .await
        .map_err(|error| format!("failed to list users: {error}"))?;

    for user in &users {
        let status = if user.active { "active" } else { "inactive" };

        println!("{}\t{}\t{}\t{status}", user.id, user.display_name, user.contact);
    }

    println!("{} user(s)", users.len());

    Ok(())
}
