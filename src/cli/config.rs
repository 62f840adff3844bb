use std::io::Write;

use sisense::Profile;
use tabwriter::TabWriter;

use crate::cli::{GlobalArgs, Output, color::*};

#[derive(Debug, clap::Args)]
pub(crate) struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum ConfigCommand {
    /// Get the current configuration
    Get,
}

pub(crate) fn handle(args: ConfigArgs, global: GlobalArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Get => config_get(global),
    }
}

fn config_get(global: GlobalArgs) -> anyhow::Result<()> {
    let mut out = anstream::stdout().lock();
    let profile = global.load_profile()?;

    match global.output.unwrap_or_default() {
        Output::Tty => {
            let mut tw = TabWriter::new(&mut out).ansi(true);
            print_profile(&mut tw, &profile)?;
            tw.flush()?;
        }
        Output::Json => {
            serde_json::to_writer(&mut out, &profile)?;
            writeln!(&mut out)?;
        }
    }

    Ok(())
}

fn print_profile(out: &mut impl Write, profile: &Profile) -> anyhow::Result<()> {
    let source = match &profile.config_path {
        Some(path) => path.display().to_string(),
        None => "(environment)".to_string(),
    };

    writeln!(out, "{HEADER}Profile from {source}{HEADER:#}")?;
    writeln!(out, "{GREEN}Domain{GREEN:#}\t{}", profile.domain)?;
    writeln!(out, "{GREEN}Token{GREEN:#}\t*********")?;
    writeln!(out, "{GREEN}Base URL{GREEN:#}\t{}", profile.base_url())?;
    writeln!(out, "{GREEN}Verify TLS{GREEN:#}\t{}", profile.verify_tls)?;
    writeln!(
        out,
        "{GREEN}Timeout{GREEN:#}\t{}",
        humantime::format_duration(profile.timeout)
    )?;
    writeln!(out, "{GREEN}Log File{GREEN:#}\t{}", profile.log_file.display())?;
    writeln!(out, "{GREEN}Debug{GREEN:#}\t{}", profile.debug)?;

    Ok(())
}
