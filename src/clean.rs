use std::cmp::Ordering;
use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli::CleanArgs;
use crate::formats::{CleanedRecord, RawRow, UNKNOWN};

const DEFAULT_TYPE: &str = "Other";

pub fn run(args: CleanArgs) -> anyhow::Result<()> {
    let input = PathBuf::from(&args.input);
    let out = PathBuf::from(&args.out);

    let rows = crate::dataset::read_raw_rows(&input)
        .with_context(|| format!("load raw dataset: {}", input.display()))?;
    tracing::info!(rows = rows.len(), path = %input.display(), "loaded raw dataset");
    if rows.is_empty() {
        anyhow::bail!("raw dataset has no rows: {}", input.display());
    }
    log_status_preview(&rows);

    let cleaned = normalize(rows);
    crate::dataset::write_cleaned(&out, &cleaned)
        .with_context(|| format!("save cleaned dataset: {}", out.display()))?;
    tracing::info!(path = %out.display(), "cleaned dataset saved");

    let average_score = average_score(&cleaned)
        .map(|score| format!("{score:.2}"))
        .unwrap_or_else(|| "n/a".to_owned());
    tracing::info!(
        rows = cleaned.len(),
        average_score = %average_score,
        most_common_type = most_common_type(&cleaned).unwrap_or("n/a"),
        "clean summary"
    );

    Ok(())
}

/// Coerces every raw row, derives the watcher columns and orders the result by
/// score, highest first. Rows without a score keep their relative order at the end.
pub fn normalize(rows: Vec<RawRow>) -> Vec<CleanedRecord> {
    let mut cleaned = rows.into_iter().map(clean_row).collect::<Vec<_>>();
    cleaned.sort_by(|a, b| compare_score_desc(a.score, b.score));
    cleaned
}

fn clean_row(row: RawRow) -> CleanedRecord {
    let watching = parse_count(row.watching.as_deref()).unwrap_or(0);
    let completed = parse_count(row.completed.as_deref()).unwrap_or(0);
    let on_hold = parse_count(row.on_hold.as_deref()).unwrap_or(0);
    let dropped = parse_count(row.dropped.as_deref()).unwrap_or(0);
    let plan_to_watch = parse_count(row.plan_to_watch.as_deref()).unwrap_or(0);
    let total_watchers = [watching, completed, on_hold, dropped, plan_to_watch]
        .into_iter()
        .fold(0_u64, u64::saturating_add);

    CleanedRecord {
        rank: parse_count(row.rank.as_deref()).and_then(|rank| u32::try_from(rank).ok()),
        title: row.title.unwrap_or_default(),
        score: parse_decimal(row.score.as_deref()),
        rating_users: parse_count(row.rating_users.as_deref()),
        kind: row
            .kind
            .map(|kind| kind.trim().to_owned())
            .filter(|kind| !kind.is_empty())
            .unwrap_or_else(|| DEFAULT_TYPE.to_owned()),
        episodes: parse_episodes(row.episodes.as_deref()),
        duration: row.duration.unwrap_or_default(),
        source: row.source.unwrap_or_default(),
        aired: row.aired.unwrap_or_default(),
        season: row.season.unwrap_or_default(),
        genres: row.genres.unwrap_or_default(),
        watching,
        completed,
        on_hold,
        dropped,
        plan_to_watch,
        season_number: parse_count(row.season_number.as_deref())
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0),
        total_watchers,
        completion_rate: completion_rate(completed, total_watchers),
    }
}

pub fn completion_rate(completed: u64, total_watchers: u64) -> f64 {
    if total_watchers == 0 {
        return 0.0;
    }
    let rate = completed as f64 / total_watchers as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

fn compare_score_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn parse_decimal(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Non-negative integer with optional thousands separators. Integral decimals
/// such as `12.0` are accepted.
fn parse_count(value: Option<&str>) -> Option<u64> {
    let value = value?.trim().replace(',', "");
    if let Ok(count) = value.parse::<u64>() {
        return Some(count);
    }
    let decimal = value.parse::<f64>().ok()?;
    if decimal.is_finite() && decimal >= 0.0 && decimal.fract() == 0.0 && decimal <= u64::MAX as f64 {
        Some(decimal as u64)
    } else {
        None
    }
}

fn parse_episodes(value: Option<&str>) -> Option<u32> {
    let value = value?.trim();
    if value == UNKNOWN {
        return None;
    }
    parse_count(Some(value)).and_then(|episodes| u32::try_from(episodes).ok())
}

pub fn average_score(records: &[CleanedRecord]) -> Option<f64> {
    let scores = records.iter().filter_map(|r| r.score).collect::<Vec<_>>();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Most frequent Type; ties go to the type seen first.
pub fn most_common_type(records: &[CleanedRecord]) -> Option<&str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(kind, _)| *kind == record.kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((record.kind.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (kind, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((kind, count));
        }
    }
    best.map(|(kind, _)| kind)
}

fn log_status_preview(rows: &[RawRow]) {
    let preview = |pick: fn(&RawRow) -> Option<&str>| {
        rows.iter()
            .take(5)
            .map(|row| pick(row).unwrap_or(""))
            .collect::<Vec<_>>()
    };

    tracing::debug!(values = ?preview(|r| r.watching.as_deref()), "cleaning column Watching");
    tracing::debug!(values = ?preview(|r| r.completed.as_deref()), "cleaning column Completed");
    tracing::debug!(values = ?preview(|r| r.on_hold.as_deref()), "cleaning column On_Hold");
    tracing::debug!(values = ?preview(|r| r.dropped.as_deref()), "cleaning column Dropped");
    tracing::debug!(
        values = ?preview(|r| r.plan_to_watch.as_deref()),
        "cleaning column Plan_to_Watch"
    );
}
