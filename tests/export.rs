mod common;

use common::{FakeSheets, number_cell, string_cell};
use specs::config::Config;
use specs::export::{export_specs, format_sheet_datetime, record_from_row};
use specs::google::CellData;
use specs::Catalog;
use tempfile::tempdir;

fn date_cell(value: &str) -> CellData {
    CellData {
        user_entered_value: None,
        formatted_value: Some(value.to_string()),
    }
}

fn full_row(index: &str) -> Vec<CellData> {
    vec![
        string_cell("Web"),
        string_cell(&format!("{} - Menus", index)),
        string_cell("d1"),
        string_cell("https://docs.google.com/document/d/d1/edit"),
        string_cell(index),
        string_cell("Menus"),
        string_cell("Approved"),
        string_cell("Jane Doe"),
        string_cell("Standard"),
        date_cell("2024-01-01T00:00:00.000Z"),
        date_cell("2024-03-15T09:05:00.000Z"),
        number_cell(4.0),
        number_cell(1.0),
    ]
}

#[test]
fn sheet_timestamps_are_reformatted() {
    assert_eq!(
        format_sheet_datetime("2024-01-01T00:00:00.000Z").as_deref(),
        Some("01 Jan 2024 00:00")
    );
    assert_eq!(format_sheet_datetime("yesterday"), None);
}

#[test]
fn row_maps_onto_a_record() {
    let record = record_from_row(&full_row("WB001")).unwrap();

    assert_eq!(record.folder_name, "Web");
    assert_eq!(record.file_id, "d1");
    assert_eq!(record.index, "WB001");
    assert_eq!(record.spec_type, "Standard");
    assert_eq!(record.created, "01 Jan 2024 00:00");
    assert_eq!(record.last_updated, "15 Mar 2024 09:05");
    assert_eq!(record.number_of_comments, 4);
    assert_eq!(record.open_comments, 1);
}

#[test]
fn short_rows_leave_trailing_fields_empty() {
    let row = vec![string_cell(""), string_cell("Loose doc")];
    let record = record_from_row(&row).unwrap();

    assert_eq!(record.file_name, "Loose doc");
    assert_eq!(record.index, "");
    assert_eq!(record.created, "");
    assert_eq!(record.number_of_comments, 0);
}

#[test]
fn rows_without_a_file_name_are_not_specs() {
    assert!(record_from_row(&vec![]).is_none());
    assert!(record_from_row(&vec![string_cell("Web"), CellData::default()]).is_none());
}

#[test]
fn export_writes_every_spec_row() {
    let dir = tempdir().unwrap();
    let specs_file = dir.path().join("specs.json");
    let specs_file_name = specs_file.to_string_lossy().to_string();
    let config = Config::from_lookup(|key| match key {
        "SPECS_FILE" => Some(specs_file_name.clone()),
        _ => None,
    })
    .unwrap();

    let mut sheets = FakeSheets::with_sheets(&[(1, "Specs")]);
    sheets.rows = vec![full_row("WB001"), vec![], full_row("WB002")];

    let written = export_specs(&sheets, &config).unwrap();

    assert_eq!(written, 2);
    let catalog = Catalog::load(&specs_file).unwrap();
    let indexes: Vec<&str> = catalog.records().iter().map(|r| r.index.as_str()).collect();
    assert_eq!(indexes, vec!["WB001", "WB002"]);
}
