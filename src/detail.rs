use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::fetch::PageSource;
use crate::formats::{DetailFields, StatusCounts, UNKNOWN};
use crate::html::{collapse_whitespace, element_text, selector, visible_text, visible_text_nodes};

static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static GENRE: LazyLock<Selector> = LazyLock::new(|| selector("span[itemprop='genre']"));

/// Label text on the page for each status, in `StatusCounts` field order.
const STATUS_LABELS: [&str; 5] = ["Watching", "Completed", "On-Hold", "Dropped", "Plan to Watch"];

static STATUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STATUS_LABELS
        .iter()
        .map(|label| {
            Regex::new(&format!(r"{}:\s*([\d,]+)", regex::escape(label)))
                .expect("valid status pattern")
        })
        .collect()
});

/// Fetches a detail page and extracts its fields. A page that cannot be
/// fetched yields `DetailFields::default()` so one bad title never stops a crawl.
pub fn fetch_detail<S: PageSource + ?Sized>(source: &S, url: &Url) -> DetailFields {
    match source.fetch(url) {
        Ok(document) => extract_detail_fields(&document),
        Err(err) => {
            tracing::error!(%url, ?err, "detail page failed; using default details");
            DetailFields::default()
        }
    }
}

pub fn extract_detail_fields(document: &Html) -> DetailFields {
    let labeled = |label: &str| labeled_value(document, label).unwrap_or_else(|| UNKNOWN.to_owned());

    let kind = labeled("Type:");
    let season_number = infer_season_number(document, &kind);

    DetailFields {
        episodes: labeled("Episodes:"),
        duration: labeled("Duration:"),
        source: labeled("Source:"),
        aired: labeled("Aired:"),
        season: labeled("Season:"),
        genres: genres(document),
        status: status_counts(&visible_text(document)),
        season_number,
        kind,
    }
}

/// Finds the first `<span>` whose text is exactly `label` and returns the text
/// that follows it inside the same parent.
fn labeled_value(document: &Html, label: &str) -> Option<String> {
    document
        .select(&SPAN)
        .find(|span| element_text(*span) == label)
        .and_then(adjacent_text)
}

fn adjacent_text(label: ElementRef<'_>) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for sibling in label.next_siblings() {
        match sibling.value() {
            Node::Text(text) => parts.push(text),
            Node::Element(element) => {
                if element.name() == "br" {
                    break;
                }
                let Some(sibling) = ElementRef::wrap(sibling) else {
                    continue;
                };
                if element.name() == "span" && element_text(sibling).ends_with(':') {
                    break;
                }
                parts.extend(sibling.text());
            }
            _ => {}
        }
    }

    let value = collapse_whitespace(&parts.join(" "));
    (!value.is_empty()).then_some(value)
}

fn genres(document: &Html) -> String {
    let genres = document
        .select(&GENRE)
        .map(element_text)
        .filter(|genre| !genre.is_empty())
        .collect::<Vec<_>>();
    if genres.is_empty() {
        UNKNOWN.to_owned()
    } else {
        genres.join(", ")
    }
}

fn status_counts(page_text: &str) -> StatusCounts {
    let count = |idx: usize| -> u64 {
        STATUS_PATTERNS[idx]
            .captures(page_text)
            .and_then(|caps| caps[1].replace(',', "").parse().ok())
            .unwrap_or(0)
    };

    StatusCounts {
        watching: count(0),
        completed: count(1),
        on_hold: count(2),
        dropped: count(3),
        plan_to_watch: count(4),
    }
}

/// Heuristic: for TV entries, the first text fragment mentioning "Season" is
/// assumed to carry the season number as its first run of digits.
fn infer_season_number(document: &Html, kind: &str) -> u32 {
    if !kind.starts_with("TV") {
        return 1;
    }

    visible_text_nodes(document)
        .find(|text| text.contains("Season"))
        .and_then(first_digit_run)
        .filter(|season| *season > 0)
        .unwrap_or(1)
}

fn first_digit_run(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>();
    digits.parse().ok()
}
