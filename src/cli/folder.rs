use sisense::folder::{OwnerRule, OwnershipTransfer};

use crate::cli::{Cli, color::CliExamples};

#[derive(Debug, clap::Args)]
pub(crate) struct FolderArgs {
    #[command(subcommand)]
    pub command: FolderCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum FolderCommand {
    /// Hand a folder tree and its dashboards to a new owner
    Chown(FolderChownArgs),
}

#[derive(Debug, clap::Args)]
#[command(after_long_help = CliExamples("
  # Give the Finance tree to Bob, keeping view access for previous owners
  sisense folder chown Finance --owner bob@example.com --as ann@example.com \\
    --original-owner-rule view
"))]
pub(crate) struct FolderChownArgs {
    /// Folder name. The whole top-level tree holding it changes owner
    pub folder: String,
    /// Email address of the new owner
    #[arg(long)]
    pub owner: String,
    /// Email address of the user the token belongs to
    #[arg(long = "as", value_name = "EMAIL")]
    pub current_user: String,
    /// Access previous dashboard owners keep: edit or view
    #[arg(long, default_value_t = OwnerRule::Edit)]
    pub original_owner_rule: OwnerRule,
    /// Leave the dashboards in the tree alone
    #[arg(long)]
    pub folders_only: bool,
}

pub(crate) fn handle(cli: &Cli, args: FolderArgs) -> anyhow::Result<()> {
    match args.command {
        FolderCommand::Chown(args) => change_owner(cli, args),
    }
}

fn change_owner(cli: &Cli, args: FolderChownArgs) -> anyhow::Result<()> {
    let change = cli.client.transfer_ownership(&OwnershipTransfer {
        folder: &args.folder,
        new_owner: &args.owner,
        current_user: &args.current_user,
        original_owner_rule: args.original_owner_rule,
        include_dashboards: !args.folders_only,
    })?;

    eprintln!(
        "Changed owner of {} folders and {} dashboards to {}",
        change.folders_changed, change.dashboards_changed, args.owner
    );
    cli.emit(&serde_json::to_value(change)?)
}
