mod color;
mod config;
mod dashboard;
mod datamodel;
mod folder;
mod group;
mod request;
mod user;

use std::{
    io::{Write as _, stdout},
    path::PathBuf,
    str::FromStr,
};

use anyhow::bail;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use sisense::{Client, Profile, Table};
use tabwriter::TabWriter;
use tracing::debug;

use crate::cli::color::HEADER;

#[derive(Debug, Parser)]
#[command(
    name = "sisense",
    about = "Manage a Sisense deployment from the command line",
    version = env!("SISENSE_VERSION"),
    propagate_version = true
)]
pub(crate) struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// How to format output.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Output {
    Json,
    #[default]
    Tty,
}

/// key=value string pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyValue(String, String);

impl KeyValue {
    fn into_strings(self) -> (String, String) {
        (self.0, self.1)
    }
}

impl FromStr for KeyValue {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((left, right)) = s.split_once('=') else {
            bail!("Invalid key=value pair: {}", s);
        };

        Ok(KeyValue(left.to_owned(), right.to_owned()))
    }
}

#[derive(Debug, clap::Args)]
#[command(next_help_heading = "Global Options")]
pub(crate) struct GlobalArgs {
    /// Path to the config file [default: $SISENSE_CONFIG or config.yaml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Output format
    #[arg(long, short = 'O', global = true)]
    pub output: Option<Output>,
    /// Write tabular output to a CSV file instead of stdout
    #[arg(long, global = true, value_name = "PATH")]
    pub csv: Option<PathBuf>,
    /// Print verbose logs
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub(crate) fn load_profile(&self) -> anyhow::Result<Profile> {
        let profile = match &self.config {
            Some(path) => Profile::from_env(path)?,
            None => Profile::from_default_env()?,
        };

        Ok(profile.with_ua_product("sisense-cli"))
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print version.
    Version,
    /// Send a single request to the API
    Request(request::RequestArgs),
    /// Manage users
    User(user::UserArgs),
    /// Show group membership
    Group(group::GroupArgs),
    /// List dashboards and their shares
    Dashboard(dashboard::DashboardArgs),
    /// Inspect data models and schedule builds
    Datamodel(datamodel::DatamodelArgs),
    /// Change folder and dashboard ownership
    Folder(folder::FolderArgs),
    /// Show the resolved configuration
    Config(config::ConfigArgs),
}

pub(crate) struct Cli {
    pub(crate) client: Client,
    pub(crate) global: GlobalArgs,
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    // Some commands don't require a client.
    match args.command {
        Command::Version => {
            println!("sisense {}", env!("SISENSE_VERSION"));
            return Ok(());
        }
        Command::Config(config_args) => return config::handle(config_args, args.global),
        _ => (),
    }

    let profile = args.global.load_profile()?;
    debug!(?profile, command = ?args.command, "cli invocation");

    let cli = Cli {
        client: Client::new(profile)?,
        global: args.global,
    };

    match args.command {
        Command::Version => unreachable!(),
        Command::Config(_) => unreachable!(),
        Command::Request(args) => request::handle(&cli, args),
        Command::User(args) => user::handle(&cli, args),
        Command::Group(args) => group::handle(&cli, args),
        Command::Dashboard(args) => dashboard::handle(&cli, args),
        Command::Datamodel(args) => datamodel::handle(&cli, args),
        Command::Folder(args) => folder::handle(&cli, args),
    }
}

impl Cli {
    /// Print rows of serializable items. See [Cli::emit].
    pub(crate) fn emit_rows<T: Serialize>(&self, rows: &[T]) -> anyhow::Result<()> {
        self.emit(&serde_json::to_value(rows)?)
    }

    /// Print JSON data in the requested output format, or export it to the
    /// `--csv` destination. Null prints nothing.
    pub(crate) fn emit(&self, data: &Value) -> anyhow::Result<()> {
        if data.is_null() {
            return Ok(());
        }

        if let Some(path) = &self.global.csv {
            self.client.export_csv(data, path)?;
            eprintln!("Exported to {}", path.display());
            return Ok(());
        }

        match self.global.output.unwrap_or_default() {
            Output::Json => {
                serde_json::to_writer(stdout(), data)?;
                println!();
            }
            Output::Tty => {
                let table = self.client.normalize(data)?;
                print_table(&table)?;
            }
        }

        Ok(())
    }
}

fn print_table(table: &Table) -> anyhow::Result<()> {
    let mut out = anstream::stdout().lock();
    if table.columns().is_empty() {
        return Ok(());
    }

    let mut tw = TabWriter::new(&mut out).ansi(true);
    let header = table.columns().join("\t");
    writeln!(&mut tw, "{HEADER}{header}{HEADER:#}")?;

    for row in table.rows() {
        let cells: Vec<_> = row
            .iter()
            .map(|v| sisense::cell_text(v).replace(['\t', '\n'], " "))
            .collect();
        writeln!(&mut tw, "{}", cells.join("\t"))?;
    }

    tw.flush()?;
    Ok(())
}
