//! SVG rendering for the report charts.
//!
//! Charts use the SVG backend so that text is emitted as `<text>` elements and
//! no system fonts are needed at render time.

use std::path::Path;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::formats::CleanedRecord;
use crate::report::{self, ChartOutcome};

const FONT: &str = "sans-serif";
const ANNOTATION_GRAY: RGBColor = RGBColor(0x44, 0x44, 0x44);

/// Evenly spaced hues, similar to seaborn's "husl" palette.
pub fn palette(n: usize) -> Vec<HSLColor> {
    let n = n.max(1);
    (0..n)
        .map(|i| HSLColor(i as f64 / n as f64, 0.65, 0.55))
        .collect()
}

struct Bar {
    label: String,
    value: f64,
    annotation: String,
}

struct BarChart<'a> {
    caption: &'a str,
    x_desc: &'a str,
    size: (u32, u32),
    label_area: u32,
    x_max: f64,
}

/// Horizontal bars, first bar on top, each annotated just past `annotate_at`.
fn draw_horizontal_bars(
    path: &Path,
    layout: &BarChart<'_>,
    bars: &[Bar],
    annotate_at: impl Fn(&Bar) -> f64,
) -> anyhow::Result<()> {
    let n = i32::try_from(bars.len())?;
    let colors = palette(bars.len());

    let root = SVGBackend::new(path, layout.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(layout.caption, (FONT, 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(layout.label_area)
        .build_cartesian_2d(0.0..layout.x_max, (0..n).into_segmented())?;

    // Segment 0 is the bottom of the plot, so bar `i` lives in segment n-1-i.
    let slot = |i: usize| n - 1 - i as i32;
    let label_for = |value: &SegmentValue<i32>| match value {
        SegmentValue::CenterOf(segment) => usize::try_from(n - 1 - segment)
            .ok()
            .and_then(|i| bars.get(i))
            .map(|bar| bar.label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(bars.len())
        .y_label_formatter(&label_for)
        .x_desc(layout.x_desc)
        .axis_desc_style((FONT, 16))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let mut rect = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(slot(i))),
                (bar.value, SegmentValue::Exact(slot(i) + 1)),
            ],
            colors[i % colors.len()].filled(),
        );
        rect.set_margin(6, 6, 0, 0);
        rect
    }))?;

    let annotation_style = (FONT, 14)
        .into_font()
        .color(&ANNOTATION_GRAY)
        .pos(Pos::new(HPos::Left, VPos::Center));
    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        Text::new(
            bar.annotation.clone(),
            (annotate_at(bar), SegmentValue::CenterOf(slot(i))),
            annotation_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

pub fn top_ten(records: &[CleanedRecord], path: &Path) -> anyhow::Result<ChartOutcome> {
    let top = report::top_scored(records, 10);
    if top.is_empty() {
        return Ok(ChartOutcome::Skipped("no scored titles"));
    }

    let max_score = top
        .iter()
        .filter_map(|record| record.score)
        .fold(0.0_f64, f64::max);
    let bars = top
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let score = record.score.unwrap_or(0.0);
            let annotation = if record.total_watchers > 0 {
                format!(
                    "{score:.2}   {}",
                    report::format_viewers(record.total_watchers)
                )
            } else {
                format!("{score:.2}")
            };
            Bar {
                label: format!("#{}  {}", i + 1, record.title),
                value: score,
                annotation,
            }
        })
        .collect::<Vec<_>>();

    let layout = BarChart {
        caption: "Top 10 Highest Rated Anime with Viewership",
        x_desc: "Average Score (out of 10)",
        size: (1500, 800),
        label_area: 420,
        x_max: max_score + 2.0,
    };
    draw_horizontal_bars(path, &layout, &bars, |_| max_score + 0.15)?;
    Ok(ChartOutcome::Written(path.to_path_buf()))
}

pub fn genre_distribution(records: &[CleanedRecord], path: &Path) -> anyhow::Result<ChartOutcome> {
    let counts = report::genre_counts(records, 10);
    if counts.is_empty() {
        return Ok(ChartOutcome::Skipped("no genres"));
    }

    let max_count = counts.iter().map(|(_, count)| *count).max().unwrap_or(1) as f64;
    let bars = counts
        .into_iter()
        .map(|(genre, count)| Bar {
            label: genre,
            value: count as f64,
            annotation: count.to_string(),
        })
        .collect::<Vec<_>>();

    let layout = BarChart {
        caption: "Top 10 Most Common Anime Genres",
        x_desc: "Count",
        size: (1400, 800),
        label_area: 200,
        x_max: max_count * 1.15,
    };
    draw_horizontal_bars(path, &layout, &bars, |bar| bar.value + max_count * 0.01)?;
    Ok(ChartOutcome::Written(path.to_path_buf()))
}

pub fn watching_status(records: &[CleanedRecord], path: &Path) -> anyhow::Result<ChartOutcome> {
    let Some(totals) = report::status_totals(records) else {
        return Ok(ChartOutcome::Skipped("all watching status counts are zero"));
    };

    let max_total = totals.iter().map(|(_, total)| *total).max().unwrap_or(1) as f64;
    let bars = totals
        .into_iter()
        .map(|(status, total)| Bar {
            label: status.to_owned(),
            value: total as f64,
            annotation: report::format_compact(total),
        })
        .collect::<Vec<_>>();

    let layout = BarChart {
        caption: "Anime Watching Status Distribution",
        x_desc: "Number of Users",
        size: (1200, 700),
        label_area: 180,
        x_max: max_total * 1.2,
    };
    draw_horizontal_bars(path, &layout, &bars, |bar| bar.value + max_total * 0.01)?;
    Ok(ChartOutcome::Written(path.to_path_buf()))
}

pub fn score_vs_episodes(records: &[CleanedRecord], path: &Path) -> anyhow::Result<ChartOutcome> {
    let points = report::scatter_points(records);
    if points.is_empty() {
        return Ok(ChartOutcome::Skipped("no rows with both episodes and score"));
    }

    let xy = points
        .iter()
        .map(|point| (point.episodes, point.score))
        .collect::<Vec<_>>();
    let x_min = xy.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let x_max = xy.iter().map(|(x, _)| *x).fold(f64::NEG_INFINITY, f64::max);
    let trend = report::fit_trend(&xy).map(|(slope, intercept)| {
        vec![
            (x_min, slope * x_min + intercept),
            (x_max, slope * x_max + intercept),
        ]
    });

    let ys = xy
        .iter()
        .map(|(_, y)| *y)
        .chain(trend.iter().flatten().map(|(_, y)| *y));
    let (y_min, y_max) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
        (lo.min(y), hi.max(y))
    });
    let y_pad = ((y_max - y_min) * 0.1).max(0.25);
    let x_range = 0.0..(x_max * 1.05).max(1.0);
    let y_range = (y_min - y_pad)..(y_max + y_pad);

    let max_ratings = points
        .iter()
        .map(|point| point.rating_users)
        .max()
        .unwrap_or(0)
        .max(1);
    let mut kinds: Vec<&str> = Vec::new();
    for point in &points {
        if !kinds.contains(&point.kind) {
            kinds.push(point.kind);
        }
    }
    let colors = palette(kinds.len());

    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Episodes vs Score (size = ratings count)", (FONT, 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc("Number of Episodes")
        .y_desc("Score")
        .axis_desc_style((FONT, 16))
        .draw()?;

    for (kind, color) in kinds.iter().zip(colors) {
        chart
            .draw_series(
                points
                    .iter()
                    .filter(|point| point.kind == *kind)
                    .map(|point| {
                        Circle::new(
                            (point.episodes, point.score),
                            bubble_radius(point.rating_users, max_ratings),
                            color.mix(0.6).filled(),
                        )
                    }),
            )?
            .label(*kind)
            .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
    }

    if let Some(line) = trend {
        chart
            .draw_series(DashedLineSeries::new(line, 10, 6, RED.stroke_width(2)))?
            .label("trend")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(ChartOutcome::Written(path.to_path_buf()))
}

/// Maps a rating count onto a 4..=24 px radius, area-proportional.
fn bubble_radius(rating_users: u64, max_ratings: u64) -> u32 {
    let ratio = (rating_users as f64 / max_ratings as f64).clamp(0.0, 1.0);
    (4.0 + ratio.sqrt() * 20.0).round() as u32
}
