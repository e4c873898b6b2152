use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::cli::CollectArgs;
use crate::detail;
use crate::fetch::{HttpFetcher, PageSource, RetryPolicy};
use crate::formats::RawRecord;
use crate::listing;

/// A uniformly sampled pause between outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    min: Duration,
    max: Duration,
}

impl Delay {
    pub const NONE: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms.max(min_ms)),
        }
    }

    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let millis = rng.random_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    pub fn pause(&self) {
        let delay = self.sample(&mut rand::rng());
        if !delay.is_zero() {
            tracing::debug!(?delay, "politeness delay");
            thread::sleep(delay);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CrawlOptions {
    pub listing_delay: Delay,
    pub detail_delay: Delay,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            listing_delay: Delay::from_millis(2_000, 4_000),
            detail_delay: Delay::from_millis(5_000, 10_000),
        }
    }
}

pub struct Crawler<'a, S: PageSource + ?Sized> {
    source: &'a S,
    options: CrawlOptions,
}

impl<'a, S: PageSource + ?Sized> Crawler<'a, S> {
    pub fn new(source: &'a S, options: CrawlOptions) -> Self {
        Self { source, options }
    }

    /// Walks every listing page in order and returns one record per entry row
    /// that parsed. A listing page that cannot be fetched aborts the crawl.
    pub fn crawl(&self, listing_urls: &[Url]) -> anyhow::Result<Vec<RawRecord>> {
        let mut records = Vec::new();

        for listing_url in listing_urls {
            tracing::info!(url = %listing_url, "fetching listing page");
            let document = self
                .source
                .fetch(listing_url)
                .with_context(|| format!("fetch listing page: {listing_url}"))?;
            self.options.listing_delay.pause();

            let rows = listing::listing_rows(&document);
            let total = rows.len();
            if total == 0 {
                tracing::warn!(url = %listing_url, "listing page has no entries");
            }

            for (idx, row) in rows.into_iter().enumerate() {
                let entry = match listing::extract_listing_entry(row, listing_url) {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::error!(url = %listing_url, entry = idx + 1, ?err, "skipping listing entry");
                        continue;
                    }
                };

                tracing::info!(
                    entry = idx + 1,
                    total,
                    rank = entry.rank,
                    title = %entry.title,
                    "processing entry"
                );
                let details = detail::fetch_detail(self.source, &entry.link);
                records.push(RawRecord::new(entry, details));
                self.options.detail_delay.pause();
            }
        }

        Ok(records)
    }
}

pub fn run(args: CollectArgs) -> anyhow::Result<()> {
    let base_url = Url::parse(&args.base_url).context("parse --base-url")?;
    if base_url.scheme() != "http" && base_url.scheme() != "https" {
        anyhow::bail!("--base-url must be http/https: {base_url}");
    }
    let listing_urls = listing::listing_urls(&base_url, &args.offsets);

    let policy = RetryPolicy {
        max_attempts: args.max_attempts,
        base_backoff: Duration::from_millis(args.backoff_ms),
        ..RetryPolicy::default()
    };
    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout_secs), policy)
        .context("initialize fetcher")?;
    let options = CrawlOptions {
        listing_delay: Delay::from_millis(args.listing_delay_min_ms, args.listing_delay_max_ms),
        detail_delay: Delay::from_millis(args.detail_delay_min_ms, args.detail_delay_max_ms),
    };

    let records = Crawler::new(&fetcher, options).crawl(&listing_urls)?;

    let out_path = PathBuf::from(&args.out);
    crate::dataset::write_raw(&out_path, &records).context("save raw dataset")?;
    tracing::info!(path = %out_path.display(), "raw dataset saved");

    let average_score = records.iter().map(|r| r.score).sum::<f64>() / records.len() as f64;
    tracing::info!(
        entries = records.len(),
        average_score = %format_args!("{average_score:.2}"),
        "collect summary"
    );

    Ok(())
}
