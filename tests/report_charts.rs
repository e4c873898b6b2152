use std::fs;
use std::path::Path;

use animestats::formats::CLEANED_COLUMNS;
use animestats::report::{
    GENRE_DISTRIBUTION_FILE, SCORE_VS_EPISODES_FILE, TOP_TEN_FILE, WATCHING_STATUS_FILE,
};
use predicates::prelude::*;

fn write_cleaned(path: &Path, rows: &[&str]) -> anyhow::Result<()> {
    let mut contents = format!("{}\n", CLEANED_COLUMNS.join(","));
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    fs::write(path, contents)?;
    Ok(())
}

fn report(input: &Path, out: &Path) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("animestats");
    cmd.args([
        "report",
        "--input",
        input.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ])
    .assert()
}

fn chart_files(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[test]
fn all_zero_statuses_skip_the_status_chart_only() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let input = temp.path().join("cleaned.csv");
    let plots = temp.path().join("plots");
    write_cleaned(
        &input,
        &[
            "1,Frieren,9.3,500000,TV,28,24 min. per ep.,Manga,2023,Fall 2023,\"Adventure, Drama\",0,0,0,0,0,1,0,0.0",
            "2,Monster,8.9,300000,TV,74,24 min. per ep.,Manga,2004,Spring 2004,\"Drama, Mystery\",0,0,0,0,0,1,0,0.0",
            "3,Your Name.,8.8,900000,Movie,1,1 hr. 46 min.,Original,2016,,\"Drama, Romance\",0,0,0,0,0,1,0,0.0",
        ],
    )?;

    report(&input, &plots)
        .success()
        .stderr(predicate::str::contains("chart skipped"));

    let mut expected = vec![
        GENRE_DISTRIBUTION_FILE.to_owned(),
        SCORE_VS_EPISODES_FILE.to_owned(),
        TOP_TEN_FILE.to_owned(),
    ];
    expected.sort();
    assert_eq!(chart_files(&plots)?, expected);
    assert!(!plots.join(WATCHING_STATUS_FILE).exists());
    Ok(())
}

#[test]
fn header_only_dataset_writes_no_charts() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let input = temp.path().join("cleaned.csv");
    let plots = temp.path().join("plots");
    write_cleaned(&input, &[])?;

    report(&input, &plots).success();

    assert!(chart_files(&plots)?.is_empty());
    Ok(())
}

#[test]
fn rows_without_scores_or_episodes_still_get_genre_and_status_charts() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let input = temp.path().join("cleaned.csv");
    let plots = temp.path().join("plots");
    write_cleaned(
        &input,
        &[
            "1,Mystery Box,,,Other,,,,,,Unknown,10,20,0,5,40,,75,26.67",
            "2,Second Box,,,Other,,,,,,\"Comedy, Unknown\",1,2,3,4,5,,15,13.33",
        ],
    )?;

    report(&input, &plots).success();

    let mut expected = vec![
        GENRE_DISTRIBUTION_FILE.to_owned(),
        WATCHING_STATUS_FILE.to_owned(),
    ];
    expected.sort();
    assert_eq!(chart_files(&plots)?, expected);

    let genres = fs::read_to_string(plots.join(GENRE_DISTRIBUTION_FILE))?;
    assert!(genres.contains("Unknown"));
    Ok(())
}

#[test]
fn missing_cleaned_dataset_is_fatal() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;

    report(&temp.path().join("missing.csv"), &temp.path().join("plots"))
        .failure()
        .stderr(predicate::str::contains("load cleaned dataset"));
    Ok(())
}
