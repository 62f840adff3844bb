use sisense::datamodel::BuildType;

use crate::cli::{Cli, color::CliExamples};

#[derive(Debug, clap::Args)]
pub(crate) struct DatamodelArgs {
    #[command(subcommand)]
    pub command: DatamodelCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum DatamodelCommand {
    /// List every column of a data model
    Columns(DatamodelColumnsArgs),
    /// Flag the columns of a data model that no dashboard uses
    Unused(DatamodelUnusedArgs),
    /// Schedule a weekly build of a data model
    Schedule(DatamodelScheduleArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct DatamodelColumnsArgs {
    /// Data model title
    pub name: String,
}

#[derive(Debug, clap::Args)]
pub(crate) struct DatamodelUnusedArgs {
    /// Data model title
    pub name: String,
    /// Only list the columns no dashboard uses
    #[arg(long)]
    pub unused_only: bool,
}

#[derive(Debug, clap::Args)]
#[command(after_long_help = CliExamples("
  # Full build every weekday at 02:30 UTC
  sisense datamodel schedule Sales --day MON --day TUE --day WED --day THU --day FRI \\
    --hour 2 --minute 30 --build-type full

  # Every day
  sisense datamodel schedule Sales --day '*' --hour 0 --minute 0
"))]
pub(crate) struct DatamodelScheduleArgs {
    /// Data model title
    pub name: String,
    /// Day of the week (SUN to SAT), or * for every day (repeatable)
    #[arg(long = "day", required = true)]
    pub days: Vec<String>,
    /// Hour, in UTC (0-23)
    #[arg(long)]
    pub hour: u8,
    /// Minute (0-59)
    #[arg(long)]
    pub minute: u8,
    /// Build type: accumulate, full or schema_changes
    #[arg(long, default_value_t = BuildType::Accumulate)]
    pub build_type: BuildType,
}

pub(crate) fn handle(cli: &Cli, args: DatamodelArgs) -> anyhow::Result<()> {
    match args.command {
        DatamodelCommand::Columns(args) => list_columns(cli, args),
        DatamodelCommand::Unused(args) => list_unused(cli, args),
        DatamodelCommand::Schedule(args) => schedule_build(cli, args),
    }
}

fn list_columns(cli: &Cli, args: DatamodelColumnsArgs) -> anyhow::Result<()> {
    let columns = cli.client.get_datamodel_columns(&args.name)?;
    cli.emit_rows(&columns)
}

fn list_unused(cli: &Cli, args: DatamodelUnusedArgs) -> anyhow::Result<()> {
    let mut columns = cli.client.get_unused_columns(&args.name)?;
    if args.unused_only {
        columns.retain(|c| !c.used);
    }

    cli.emit_rows(&columns)
}

fn schedule_build(cli: &Cli, args: DatamodelScheduleArgs) -> anyhow::Result<()> {
    let DatamodelScheduleArgs {
        name,
        days,
        hour,
        minute,
        build_type,
    } = args;

    let created = cli
        .client
        .create_schedule_build(&name, &days, hour, minute, build_type)?;

    eprintln!("Scheduled {build_type} build for {name}");
    cli.emit(&created)
}
