use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::charts;
use crate::cli::ReportArgs;
use crate::formats::CleanedRecord;

pub const TOP_TEN_FILE: &str = "top_10_anime.svg";
pub const SCORE_VS_EPISODES_FILE: &str = "score_vs_episodes.svg";
pub const GENRE_DISTRIBUTION_FILE: &str = "genre_distribution.svg";
pub const WATCHING_STATUS_FILE: &str = "watching_status.svg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    Written(PathBuf),
    Skipped(&'static str),
}

pub(crate) type ChartFn = fn(&[CleanedRecord], &Path) -> anyhow::Result<ChartOutcome>;

const CHARTS: [(&str, ChartFn); 4] = [
    (TOP_TEN_FILE, charts::top_ten),
    (SCORE_VS_EPISODES_FILE, charts::score_vs_episodes),
    (GENRE_DISTRIBUTION_FILE, charts::genre_distribution),
    (WATCHING_STATUS_FILE, charts::watching_status),
];

pub fn run(args: ReportArgs) -> anyhow::Result<()> {
    let input = PathBuf::from(&args.input);
    let plots_dir = PathBuf::from(&args.out);

    let records = crate::dataset::read_cleaned(&input)
        .with_context(|| format!("load cleaned dataset: {}", input.display()))?;
    tracing::info!(rows = records.len(), path = %input.display(), "loaded cleaned dataset");

    std::fs::create_dir_all(&plots_dir)
        .with_context(|| format!("create plots dir: {}", plots_dir.display()))?;

    let written = render_all(&records, &plots_dir);
    tracing::info!(written, dir = %plots_dir.display(), "report finished");
    Ok(())
}

/// Renders every chart independently; returns how many files were written.
pub fn render_all(records: &[CleanedRecord], plots_dir: &Path) -> usize {
    let mut written = 0;
    for (file_name, render) in CHARTS {
        let path = plots_dir.join(file_name);
        match render(records, &path) {
            Ok(ChartOutcome::Written(path)) => {
                written += 1;
                tracing::info!(path = %path.display(), "chart saved");
            }
            Ok(ChartOutcome::Skipped(reason)) => {
                tracing::info!(chart = file_name, reason, "chart skipped");
            }
            Err(err) => {
                tracing::error!(chart = file_name, ?err, "chart failed");
            }
        }
    }
    written
}

/// The first `limit` scored rows. Cleaned data is already ordered by score.
pub fn top_scored(records: &[CleanedRecord], limit: usize) -> Vec<&CleanedRecord> {
    records
        .iter()
        .filter(|record| record.score.is_some())
        .take(limit)
        .collect()
}

pub fn format_viewers(count: u64) -> String {
    format!("{} viewers", format_compact(count))
}

/// `1.2M`, `350K`, or the plain number below a thousand.
pub fn format_compact(count: u64) -> String {
    let value = count as f64;
    if value >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.0}K", value / 1e3)
    } else {
        count.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint<'a> {
    pub episodes: f64,
    pub score: f64,
    pub rating_users: u64,
    pub kind: &'a str,
}

/// Rows that have both an episode count and a score.
pub fn scatter_points(records: &[CleanedRecord]) -> Vec<ScatterPoint<'_>> {
    records
        .iter()
        .filter_map(|record| {
            Some(ScatterPoint {
                episodes: f64::from(record.episodes?),
                score: record.score?,
                rating_users: record.rating_users.unwrap_or(0),
                kind: &record.kind,
            })
        })
        .collect()
}

/// Ordinary least squares fit, `(slope, intercept)`. `None` when every x is equal.
pub fn fit_trend(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, y) in points {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }
    if sxx.abs() < f64::EPSILON {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

/// Genre occurrence counts, most frequent first, ties by name.
pub fn genre_counts(records: &[CleanedRecord], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for genre in record.genres.split(',').map(str::trim) {
            if genre.is_empty() {
                continue;
            }
            *counts.entry(genre).or_default() += 1;
        }
    }

    let mut counts = counts
        .into_iter()
        .map(|(genre, count)| (genre.to_owned(), count))
        .collect::<Vec<_>>();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(limit);
    counts
}

/// Per-status totals in ascending order, or `None` when every total is zero.
pub fn status_totals(records: &[CleanedRecord]) -> Option<Vec<(&'static str, u64)>> {
    let mut totals = [
        ("Watching", 0_u64),
        ("Completed", 0),
        ("On_Hold", 0),
        ("Dropped", 0),
        ("Plan_to_Watch", 0),
    ];
    for record in records {
        let status = record.status();
        for (slot, value) in totals.iter_mut().zip([
            status.watching,
            status.completed,
            status.on_hold,
            status.dropped,
            status.plan_to_watch,
        ]) {
            slot.1 = slot.1.saturating_add(value);
        }
    }

    if totals.iter().all(|(_, total)| *total == 0) {
        return None;
    }
    let mut totals = totals.to_vec();
    totals.sort_by_key(|(_, total)| *total);
    Some(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, score: Option<f64>) -> CleanedRecord {
        CleanedRecord {
            rank: Some(1),
            title: title.to_owned(),
            score,
            rating_users: Some(1_000),
            kind: "TV".to_owned(),
            episodes: Some(12),
            duration: "24 min. per ep.".to_owned(),
            source: "Manga".to_owned(),
            aired: "2020".to_owned(),
            season: "Spring 2020".to_owned(),
            genres: "Action, Drama".to_owned(),
            watching: 0,
            completed: 0,
            on_hold: 0,
            dropped: 0,
            plan_to_watch: 0,
            season_number: Some(1),
            total_watchers: 0,
            completion_rate: 0.0,
        }
    }

    #[test]
    fn compact_formatting_matches_magnitude() {
        assert_eq!(format_compact(2_345_678), "2.3M");
        assert_eq!(format_compact(1_000_000), "1.0M");
        assert_eq!(format_compact(349_600), "350K");
        assert_eq!(format_compact(1_000), "1K");
        assert_eq!(format_compact(42), "42");
        assert_eq!(format_viewers(1_500_000), "1.5M viewers");
    }

    #[test]
    fn top_scored_skips_missing_scores_and_limits() {
        let mut records = (0..12)
            .map(|i| record(&format!("t{i}"), Some(9.0 - f64::from(i) * 0.1)))
            .collect::<Vec<_>>();
        records.insert(1, record("unscored", None));

        let top = top_scored(&records, 10);
        assert_eq!(top.len(), 10);
        assert!(top.iter().all(|r| r.title != "unscored"));
        assert_eq!(top[0].title, "t0");
        assert_eq!(top[9].title, "t9");
    }

    #[test]
    fn scatter_points_require_episodes_and_score() {
        let mut no_episodes = record("a", Some(8.0));
        no_episodes.episodes = None;
        let records = vec![no_episodes, record("b", None), record("c", Some(7.5))];

        let points = scatter_points(&records);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].score, 7.5);
        assert_eq!(points[0].episodes, 12.0);
    }

    #[test]
    fn trend_fit_recovers_a_line() {
        let points = [(1.0, 3.0), (2.0, 5.0), (3.0, 7.0), (4.0, 9.0)];
        let (slope, intercept) = fit_trend(&points).unwrap();
        assert!((slope - 2.0).abs() < 1e-9);
        assert!((intercept - 1.0).abs() < 1e-9);

        assert_eq!(fit_trend(&[(2.0, 1.0), (2.0, 3.0)]), None);
        assert_eq!(fit_trend(&[(2.0, 1.0)]), None);
    }

    #[test]
    fn genres_are_exploded_and_counted_per_occurrence() {
        let mut a = record("a", Some(9.0));
        a.genres = "Action, Drama, Fantasy".to_owned();
        let mut b = record("b", Some(8.0));
        b.genres = "Drama,Comedy".to_owned();
        let mut c = record("c", Some(7.0));
        c.genres = "Unknown".to_owned();

        let counts = genre_counts(&[a, b, c], 10);
        assert_eq!(
            counts,
            vec![
                ("Drama".to_owned(), 2),
                ("Action".to_owned(), 1),
                ("Comedy".to_owned(), 1),
                ("Fantasy".to_owned(), 1),
                ("Unknown".to_owned(), 1),
            ]
        );
        assert!(genre_counts(&[], 10).is_empty());
    }

    #[test]
    fn status_totals_are_none_when_all_zero() {
        assert_eq!(status_totals(&[record("a", Some(9.0))]), None);
    }

    #[test]
    fn status_totals_sum_and_sort_ascending() {
        let mut a = record("a", Some(9.0));
        a.watching = 10;
        a.completed = 500;
        a.plan_to_watch = 40;
        let mut b = record("b", Some(8.0));
        b.dropped = 5;
        b.completed = 100;

        let totals = status_totals(&[a, b]).unwrap();
        assert_eq!(
            totals,
            vec![
                ("On_Hold", 0),
                ("Dropped", 5),
                ("Watching", 10),
                ("Plan_to_Watch", 40),
                ("Completed", 600),
            ]
        );
    }
}
