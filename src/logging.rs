use anyhow::Context as _;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

const DEFAULT_FILTER: &str = "info";

/// HTML parsing and HTTP internals; their debug output buries the crawl log.
const QUIET_CRATES: [&str; 4] = ["html5ever", "selectors", "hyper_util", "reqwest"];

/// Installs the process-wide subscriber on stderr. `RUST_LOG` overrides the
/// `info` default; the parser and HTTP crates stay at `warn` either way.
pub fn init() -> anyhow::Result<()> {
    let mut filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("build log filter")?;
    for krate in QUIET_CRATES {
        let directive: Directive = format!("{krate}=warn")
            .parse()
            .with_context(|| format!("parse log directive for {krate}"))?;
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
