use sisense::dashboard::PAGE_SIZE;

use crate::cli::Cli;

#[derive(Debug, clap::Args)]
pub(crate) struct DashboardArgs {
    #[command(subcommand)]
    pub command: DashboardCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum DashboardCommand {
    /// List dashboards, sorted by title
    #[clap(alias = "list")]
    Ls(DashboardLsArgs),
    /// List who every dashboard is shared with
    Shares,
    /// List the table and column pairs a dashboard uses
    Columns(DashboardColumnsArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct DashboardLsArgs {
    /// Number of dashboards to skip
    #[arg(long, default_value_t = 0)]
    pub skip: usize,
    /// Maximum number of dashboards to show
    #[arg(long, default_value_t = PAGE_SIZE)]
    pub limit: usize,
}

#[derive(Debug, clap::Args)]
pub(crate) struct DashboardColumnsArgs {
    /// Dashboard title
    pub name: String,
}

pub(crate) fn handle(cli: &Cli, args: DashboardArgs) -> anyhow::Result<()> {
    match args.command {
        DashboardCommand::Ls(args) => list_dashboards(cli, args),
        DashboardCommand::Shares => list_shares(cli),
        DashboardCommand::Columns(args) => list_columns(cli, args),
    }
}

fn list_dashboards(cli: &Cli, args: DashboardLsArgs) -> anyhow::Result<()> {
    let dashboards = cli.client.search_dashboards(args.skip, args.limit)?;
    cli.emit_rows(&dashboards)
}

fn list_shares(cli: &Cli) -> anyhow::Result<()> {
    let dashboards = cli.client.all_dashboards("")?;
    let shares = cli.client.dashboard_shares(&dashboards)?;
    cli.emit_rows(&shares)
}

fn list_columns(cli: &Cli, args: DashboardColumnsArgs) -> anyhow::Result<()> {
    let columns = cli.client.get_dashboard_columns(&args.name)?;
    cli.emit_rows(&columns)
}
