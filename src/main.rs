use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let cli = weekgrid::cli::Cli::parse();
    weekgrid::logging::init_tracing(cli.log_filter.clone())?;

    let config = weekgrid::AppConfig::discover(cli.data_dir.clone())
        .context("failed to resolve data directory")?;
    let command = cli.command.unwrap_or(weekgrid::cli::CliCommand::Show);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    weekgrid::commands::execute(&config, command, &mut handle)
}
