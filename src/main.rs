use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    animestats::logging::init().context("init logging")?;

    let cli = animestats::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        animestats::cli::Command::Collect(args) => {
            animestats::crawl::run(args).context("collect")?;
        }
        animestats::cli::Command::Clean(args) => {
            animestats::clean::run(args).context("clean")?;
        }
        animestats::cli::Command::Report(args) => {
            animestats::report::run(args).context("report")?;
        }
        animestats::cli::Command::All(args) => {
            animestats::pipeline::run(args).context("all")?;
        }
    }

    Ok(())
}
