use crate::cli::Cli;

#[derive(Debug, clap::Args)]
pub(crate) struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum GroupCommand {
    /// List the members of a group, or of every group
    Members(GroupMembersArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct GroupMembersArgs {
    /// Group name (case-insensitive) [default: all groups]
    pub name: Option<String>,
}

pub(crate) fn handle(cli: &Cli, args: GroupArgs) -> anyhow::Result<()> {
    match args.command {
        GroupCommand::Members(args) => members(cli, args),
    }
}

fn members(cli: &Cli, args: GroupMembersArgs) -> anyhow::Result<()> {
    match args.name {
        Some(name) => {
            let members = cli.client.users_per_group(&name)?;
            cli.emit(&serde_json::to_value(members)?)
        }
        None => {
            let all = cli.client.users_per_group_all()?;
            cli.emit_rows(&all)
        }
    }
}
