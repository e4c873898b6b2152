use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::formats::ListingEntry;
use crate::html::{element_text, selector};

static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr.ranking-list"));
static RANK: LazyLock<Selector> = LazyLock::new(|| selector("td.rank"));
static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| selector("h3.anime_ranking_h3 a"));
static SCORE_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td.score"));
static SCORE_VALUE: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static RATED_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"by\s*([\d,]+)\s*users").expect("valid rated-by pattern"));

/// Builds one listing URL per offset, e.g. `topanime.php?limit=50`.
pub fn listing_urls(base_url: &Url, offsets: &[u32]) -> Vec<Url> {
    offsets
        .iter()
        .map(|offset| {
            let mut url = base_url.clone();
            url.query_pairs_mut()
                .append_pair("limit", &offset.to_string());
            url
        })
        .collect()
}

pub fn listing_rows(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&ROW).collect()
}

/// Reads the summary fields of one ranking row. Relative detail links are
/// resolved against `page_url`.
pub fn extract_listing_entry(row: ElementRef<'_>, page_url: &Url) -> anyhow::Result<ListingEntry> {
    let rank_cell = row
        .select(&RANK)
        .next()
        .ok_or_else(|| anyhow::anyhow!("row has no rank cell"))?;
    let rank_text = element_text(rank_cell);
    let rank: u32 = rank_text
        .parse()
        .with_context(|| format!("parse rank: {rank_text:?}"))?;
    if rank == 0 {
        anyhow::bail!("rank must be positive");
    }

    let title_link = row
        .select(&TITLE_LINK)
        .next()
        .ok_or_else(|| anyhow::anyhow!("row {rank} has no title link"))?;
    let title = element_text(title_link);
    if title.is_empty() {
        anyhow::bail!("row {rank} has an empty title");
    }
    let href = title_link
        .value()
        .attr("href")
        .ok_or_else(|| anyhow::anyhow!("title link of row {rank} has no href"))?;
    let link = page_url
        .join(href)
        .with_context(|| format!("resolve detail link: {href}"))?;

    let (score, rating_users) = match row.select(&SCORE_CELL).next() {
        Some(cell) => (parse_score(cell), parse_rating_users(&element_text(cell))),
        None => (0.0, 0),
    };

    Ok(ListingEntry {
        rank,
        title,
        link,
        score,
        rating_users,
    })
}

/// `N/A` and other non-numeric scores are kept as `0.0` (unscored) rather than
/// dropping the row.
fn parse_score(cell: ElementRef<'_>) -> f64 {
    cell.select(&SCORE_VALUE)
        .next()
        .and_then(|span| element_text(span).parse::<f64>().ok())
        .filter(|score| score.is_finite() && *score >= 0.0)
        .unwrap_or(0.0)
}

fn parse_rating_users(text: &str) -> u64 {
    RATED_BY
        .captures(text)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
        .unwrap_or(0)
}
