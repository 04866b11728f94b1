use clap::{Args, Subcommand};
use roster::users::User;

mod create;
mod delete;
mod list;
mod show;

#[derive(Debug, Args)]
pub(crate) struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    List(list::ListUsersArgs),
    Show(show::ShowUserArgs),
    Create(create::CreateUserArgs),
    Delete(delete::DeleteUserArgs),
}

pub(crate) async fn run(command: UserCommand) -> Result<(), String> {
    match command.command {
        UserSubcommand::List(args) => list::run(args).await,
        UserSubcommand::Show(args) => show::run(args).await,
        UserSubcommand::Create(args) => create::run(args).await,
        UserSubcommand::Delete(args) => delete::run(args).await,
    }
}

fn print_user(user: &User) {
    println!("id: {}", user.id);
    println!("display_name: {}", user.display_name);
    println!("contact: {}", user.contact);
    println!("note: {}", user.note.as_deref().unwrap_or(""));
    println!("active: {}", user.active);
    println!("created_at: {}", user.created_at);
    println!("updated_at: {}", user.updated_at);
}
