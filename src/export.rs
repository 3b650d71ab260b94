use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;

use crate::config::Config;
use crate::error::Result;
use crate::google::{CellData, SheetRow, SheetStore};
use crate::spec::SpecRecord;

/// Data range of the tracking sheet: row 1 holds the headers.
pub const DATA_RANGE: &str = "A2:M";

const SHEET_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const DISPLAY_DATETIME_FORMAT: &str = "%d %b %Y %H:%M";

/// Reformat a sheet timestamp (`2024-01-01T00:00:00.000Z`) for display
/// (`01 Jan 2024 00:00`). Returns `None` when the input is not a timestamp.
pub fn format_sheet_datetime(value: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(value.trim(), SHEET_DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.format(DISPLAY_DATETIME_FORMAT).to_string())
}

fn cell_string(cell: Option<&CellData>) -> String {
    let Some(value) = cell.and_then(|c| c.user_entered_value.as_ref()) else {
        return String::new();
    };
    if let Some(s) = &value.string_value {
        return s.clone();
    }
    if let Some(n) = value.number_value {
        return format_number(n);
    }
    if let Some(b) = value.bool_value {
        return b.to_string();
    }
    String::new()
}

fn cell_count(cell: Option<&CellData>) -> u32 {
    cell.and_then(|c| c.user_entered_value.as_ref())
        .and_then(|v| {
            v.number_value
                .or_else(|| v.string_value.as_ref().and_then(|s| s.trim().parse().ok()))
        })
        .filter(|n| *n >= 0.0)
        .map(|n| n as u32)
        .unwrap_or(0)
}

fn cell_datetime(cell: Option<&CellData>) -> String {
    cell.and_then(|c| c.formatted_value.as_deref())
        .and_then(format_sheet_datetime)
        .unwrap_or_default()
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Map one sheet row onto a record; rows without a file name are not specs.
pub fn record_from_row(row: &SheetRow) -> Option<SpecRecord> {
    let has_file_name = row
        .get(1)
        .is_some_and(|cell| cell.user_entered_value.is_some());
    if !has_file_name {
        return None;
    }

    let cell = |i: usize| row.get(i);
    Some(SpecRecord {
        folder_name: cell_string(cell(0)),
        file_name: cell_string(cell(1)),
        file_id: cell_string(cell(2)),
        file_url: cell_string(cell(3)),
        index: cell_string(cell(4)),
        title: cell_string(cell(5)),
        status: cell_string(cell(6)),
        authors: cell_string(cell(7)),
        spec_type: cell_string(cell(8)),
        created: cell_datetime(cell(9)),
        last_updated: cell_datetime(cell(10)),
        number_of_comments: cell_count(cell(11)),
        open_comments: cell_count(cell(12)),
    })
}

/// Write records as JSON lines, replacing `path` only once fully written.
pub fn write_records(path: impl AsRef<Path>, records: &[SpecRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");

    {
        let mut writer = BufWriter::new(File::create(&staging)?);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }

    fs::rename(&staging, path)?;
    Ok(())
}

/// Fetch the live tracking sheet and save it locally for the web process.
pub fn export_specs<S: SheetStore + ?Sized>(sheets: &S, config: &Config) -> Result<usize> {
    log::info!("fetching specs from sheet '{}'", config.specs_sheet_title);
    let rows = sheets.read_rows(&config.specs_sheet_title, DATA_RANGE)?;
    let records: Vec<SpecRecord> = rows.iter().filter_map(record_from_row).collect();

    write_records(&config.specs_file, &records)?;
    log::info!("wrote {} specs to {}", records.len(), config.specs_file);
    Ok(records.len())
}
