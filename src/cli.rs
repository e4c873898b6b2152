use clap::{Args, Parser, Subcommand};

pub const DEFAULT_BASE_URL: &str = "https://myanimelist.net/topanime.php";
pub const DEFAULT_RAW_PATH: &str = "data/top_anime_detailed.csv";
pub const DEFAULT_CLEANED_PATH: &str = "data/top_anime_detailed_cleaned.csv";
pub const DEFAULT_PLOTS_DIR: &str = "plots";

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape the top-anime listing and detail pages into the raw CSV.
    Collect(CollectArgs),
    /// Normalize the raw CSV into the cleaned CSV.
    Clean(CleanArgs),
    /// Render charts from the cleaned CSV.
    Report(ReportArgs),
    /// Run collect, clean and report in sequence.
    All(AllArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CollectArgs {
    /// Listing page URL (must be http/https).
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Listing page offsets, passed as `?limit=<offset>`.
    #[arg(long, value_delimiter = ',', default_values_t = [0_u32, 50, 100])]
    pub offsets: Vec<u32>,

    /// Output path for the raw CSV.
    #[arg(long, default_value = DEFAULT_RAW_PATH)]
    pub out: String,

    /// Attempts per request, including the first.
    #[arg(long, default_value_t = 4)]
    pub max_attempts: u32,

    /// Backoff before the first retry; doubles on every further retry.
    #[arg(long, default_value_t = 1_000)]
    pub backoff_ms: u64,

    /// Per-request timeout.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = 2_000)]
    pub listing_delay_min_ms: u64,

    #[arg(long, default_value_t = 4_000)]
    pub listing_delay_max_ms: u64,

    #[arg(long, default_value_t = 5_000)]
    pub detail_delay_min_ms: u64,

    #[arg(long, default_value_t = 10_000)]
    pub detail_delay_max_ms: u64,
}

#[derive(Debug, Clone, Args)]
pub struct CleanArgs {
    /// Raw CSV (created by `collect`).
    #[arg(long, default_value = DEFAULT_RAW_PATH)]
    pub input: String,

    /// Output path for the cleaned CSV.
    #[arg(long, default_value = DEFAULT_CLEANED_PATH)]
    pub out: String,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Cleaned CSV (created by `clean`).
    #[arg(long, default_value = DEFAULT_CLEANED_PATH)]
    pub input: String,

    /// Output directory for chart files.
    #[arg(long, default_value = DEFAULT_PLOTS_DIR)]
    pub out: String,
}

#[derive(Debug, Clone, Args)]
pub struct AllArgs {
    #[command(flatten)]
    pub collect: CollectArgs,

    /// Output path for the cleaned CSV.
    #[arg(long, default_value = DEFAULT_CLEANED_PATH)]
    pub cleaned: String,

    /// Output directory for chart files.
    #[arg(long, default_value = DEFAULT_PLOTS_DIR)]
    pub plots: String,
}
