use anyhow::Context as _;

use crate::cli::{AllArgs, CleanArgs, ReportArgs};

/// Runs the three stages in order, stopping at the first failure.
pub fn run(args: AllArgs) -> anyhow::Result<()> {
    let raw_path = args.collect.out.clone();

    tracing::info!(url = %args.collect.base_url, out = %raw_path, "all: collect");
    crate::crawl::run(args.collect).context("collect")?;

    tracing::info!(input = %raw_path, out = %args.cleaned, "all: clean");
    crate::clean::run(CleanArgs {
        input: raw_path,
        out: args.cleaned.clone(),
    })
    .context("clean")?;

    tracing::info!(input = %args.cleaned, out = %args.plots, "all: report");
    crate::report::run(ReportArgs {
        input: args.cleaned,
        out: args.plots,
    })
    .context("report")?;

    Ok(())
}
