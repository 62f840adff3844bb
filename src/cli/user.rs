use sisense::user::{NewUser, UserUpdate};

use crate::cli::{Cli, color::CliExamples};

#[derive(Debug, clap::Args)]
pub(crate) struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum UserCommand {
    /// List all users
    #[clap(alias = "list")]
    Ls,
    /// Get a user by email
    Get(UserGetArgs),
    /// Create a user
    Create(UserCreateArgs),
    /// Update a user
    Update(UserUpdateArgs),
    /// Delete a user
    #[clap(alias = "delete")]
    Rm(UserRmArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct UserGetArgs {
    /// Email address
    pub email: String,
}

#[derive(Debug, clap::Args)]
#[command(after_long_help = CliExamples("
  # Create a viewer in two groups
  sisense user create --email ann@example.com --first-name Ann --role viewer --group Sales --group EMEA
"))]
pub(crate) struct UserCreateArgs {
    /// Email address
    #[arg(long)]
    pub email: String,
    /// First name
    #[arg(long)]
    pub first_name: String,
    /// Last name
    #[arg(long)]
    pub last_name: Option<String>,
    /// User name
    #[arg(long)]
    pub user_name: Option<String>,
    /// Role name, e.g. viewer, designer or dataAdmin
    #[arg(long)]
    pub role: String,
    /// Group name (repeatable)
    #[arg(long = "group")]
    pub groups: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct UserUpdateArgs {
    /// Email address of the user to update
    pub email: String,
    /// New email address
    #[arg(long)]
    pub new_email: Option<String>,
    /// New first name
    #[arg(long)]
    pub first_name: Option<String>,
    /// New last name
    #[arg(long)]
    pub last_name: Option<String>,
    /// New user name
    #[arg(long)]
    pub user_name: Option<String>,
    /// New role name
    #[arg(long)]
    pub role: Option<String>,
    /// Replace the user's groups (repeatable)
    #[arg(long = "group", conflicts_with = "clear_groups")]
    pub groups: Vec<String>,
    /// Remove the user from every group
    #[arg(long)]
    pub clear_groups: bool,
}

#[derive(Debug, clap::Args)]
pub(crate) struct UserRmArgs {
    /// Email address
    pub email: String,
}

pub(crate) fn handle(cli: &Cli, args: UserArgs) -> anyhow::Result<()> {
    match args.command {
        UserCommand::Ls => list_users(cli),
        UserCommand::Get(args) => get_user(cli, args),
        UserCommand::Create(args) => create_user(cli, args),
        UserCommand::Update(args) => update_user(cli, args),
        UserCommand::Rm(args) => delete_user(cli, args),
    }
}

fn list_users(cli: &Cli) -> anyhow::Result<()> {
    let users = cli.client.get_users_all()?;
    cli.emit_rows(&users)
}

fn get_user(cli: &Cli, args: UserGetArgs) -> anyhow::Result<()> {
    let user = cli.client.get_user(&args.email)?;
    cli.emit(&serde_json::to_value(user)?)
}

fn create_user(cli: &Cli, args: UserCreateArgs) -> anyhow::Result<()> {
    let UserCreateArgs {
        email,
        first_name,
        last_name,
        user_name,
        role,
        groups,
    } = args;

    let user = NewUser {
        email,
        user_name,
        first_name,
        last_name,
        role,
        groups,
        preferences: None,
    };

    let created = cli.client.create_user(&user)?;
    eprintln!("Created user {}", user.email);
    cli.emit(&created)
}

fn update_user(cli: &Cli, args: UserUpdateArgs) -> anyhow::Result<()> {
    let UserUpdateArgs {
        email,
        new_email,
        first_name,
        last_name,
        user_name,
        role,
        groups,
        clear_groups,
    } = args;

    let groups = if clear_groups {
        Some(Vec::new())
    } else {
        Some(groups).filter(|g| !g.is_empty())
    };

    let update = UserUpdate {
        email: new_email,
        user_name,
        first_name,
        last_name,
        role,
        groups,
        preferences: None,
    };

    let updated = cli.client.update_user(&email, &update)?;
    eprintln!("Updated user {email}");
    cli.emit(&updated)
}

fn delete_user(cli: &Cli, args: UserRmArgs) -> anyhow::Result<()> {
    cli.client.delete_user(&args.email)?;
    eprintln!("Deleted user {}", args.email);
    Ok(())
}
