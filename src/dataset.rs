use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::formats::{CLEANED_COLUMNS, CleanedRecord, RAW_COLUMNS, RawRecord, RawRow};

/// Writes the raw dataset. Refuses to create a file when nothing was collected.
pub fn write_raw(path: &Path, records: &[RawRecord]) -> anyhow::Result<()> {
    if records.is_empty() {
        anyhow::bail!("no records to save");
    }
    write_csv(path, &RAW_COLUMNS, records)
}

pub fn read_raw_rows(path: &Path) -> anyhow::Result<Vec<RawRow>> {
    read_csv(path)
}

pub fn write_cleaned(path: &Path, records: &[CleanedRecord]) -> anyhow::Result<()> {
    write_csv(path, &CLEANED_COLUMNS, records)
}

pub fn read_cleaned(path: &Path) -> anyhow::Result<Vec<CleanedRecord>> {
    read_csv(path)
}

fn write_csv<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .with_context(|| format!("create csv: {}", path.display()))?;
    writer
        .write_record(columns)
        .with_context(|| format!("write csv header: {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("write csv row: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush csv: {}", path.display()))?;
    Ok(())
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open csv: {}", path.display()))?;

    let mut rows = Vec::new();
    for (idx, row) in reader.deserialize().enumerate() {
        let row = row.with_context(|| format!("parse csv row {}: {}", idx + 1, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}
