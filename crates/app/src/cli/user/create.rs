use clap::Args;
use roster::users::UserForm;
use roster_app::domain::users::UsersService;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// User id
    #[arg(long)]
    id: String,

    /// Display name
    #[arg(long)]
    display_name: String,

    /// Password
    #[arg(long, env = "ROSTER_USER_SECRET", hide_env_values = true)]
    secret: String,

    /// Contact email address
    #[arg(long)]
    contact: String,

    /// Free-form note
    #[arg(long)]
    note: Option<String>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let form = UserForm {
        id: Some(args.id),
        display_name: Some(args.display_name),
        secret: Some(args.secret),
        contact: Some(args.contact),
        note: args.note,
    };

    let draft = form.to_draft().map_err(|violations| {
        violations
            .iter()
            .map(|violation| format!("{}: {}", violation.field.as_str(), violation.kind))
            .collect::<Vec<_>>()
            .join("\n")
    })?;

    let service = crate::cli::users_service(&args.database_url).await?;

    let user = service
        .create_user(draft)
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    super::print_user(&user);

    Ok(())
}
