mod common;

use common::{FakeDocs, FakeSheets, SheetCall, drive_file, spec_document, text};
use serde_json::Value;
use specs::extractor::{HeaderKey, TableMetadata};
use specs::google::{Comment, SheetRename};
use specs::sync::{HEADERS, SyncConfig, Synchronizer, fill_from_file_name};
use specs::SpecsError;

fn config() -> SyncConfig {
    SyncConfig {
        root_folder_id: "root".to_string(),
        specs_sheet_title: "Specs".to_string(),
        tmp_sheet_title: "Specs_tmp".to_string(),
    }
}

fn drive() -> FakeDocs {
    let mut docs = FakeDocs::default();
    docs.add_folder("web", "Web");
    docs.add_folder("api", "Api");
    docs.add_document(
        "web",
        drive_file("d1", "WB001 - Menus"),
        spec_document("WB001", "Menus", "Jane Doe"),
    );
    docs.add_document(
        "api",
        drive_file("d2", "AP001 - Pagination"),
        spec_document("AP001", "Pagination", "Bob B"),
    );
    docs.comments.insert(
        "d1".to_string(),
        vec![
            Comment { resolved: true },
            Comment { resolved: false },
            Comment { resolved: false },
        ],
    );
    docs
}

#[test]
fn writes_header_then_one_row_per_document() {
    let docs = drive();
    let sheets = FakeSheets::with_sheets(&[(1, "Specs"), (2, "Specs_tmp")]);

    let report = Synchronizer::new(&docs, &sheets, config()).run().unwrap();

    assert_eq!(report.folders, 2);
    assert_eq!(report.documents, 2);
    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 0);

    let rows = sheets.appended("Specs_tmp");
    assert_eq!(rows.len(), 3);
    let header: Vec<Value> = HEADERS.iter().map(|h| Value::from(*h)).collect();
    assert_eq!(rows[0], header);

    let row = &rows[1];
    assert_eq!(row.len(), 13);
    assert_eq!(row[0], "Web");
    assert_eq!(row[1], "WB001 - Menus");
    assert_eq!(row[2], "d1");
    assert_eq!(row[3], "https://docs.google.com/document/d/d1/edit");
    assert_eq!(row[4], "WB001");
    assert_eq!(row[5], "Menus");
    assert_eq!(row[6], "Approved");
    assert_eq!(row[7], "Jane Doe");
    assert_eq!(row[8], "Standard");
    assert_eq!(row[9], "2024-01-01T00:00:00.000Z");
    assert_eq!(row[10], "2024-02-01T00:00:00.000Z");
    assert_eq!(row[11], 3);
    assert_eq!(row[12], 2);
}

#[test]
fn staging_is_cleared_first_and_swapped_last() {
    let docs = drive();
    let sheets = FakeSheets::with_sheets(&[(1, "Specs"), (2, "Specs_tmp")]);

    Synchronizer::new(&docs, &sheets, config()).run().unwrap();

    let calls = sheets.calls();
    assert_eq!(calls.first(), Some(&SheetCall::Clear("Specs_tmp".to_string())));
    assert_eq!(
        calls.last(),
        Some(&SheetCall::Rename(vec![
            SheetRename { sheet_id: 1, title: "tmp".to_string() },
            SheetRename { sheet_id: 2, title: "Specs".to_string() },
            SheetRename { sheet_id: 1, title: "Specs_tmp".to_string() },
        ]))
    );
    assert!(!calls
        .iter()
        .any(|call| matches!(call, SheetCall::Append(title, _) if title == "Specs")));
}

#[test]
fn unreadable_documents_are_skipped() {
    let mut docs = drive();
    docs.add_document(
        "web",
        drive_file("d3", "Meeting notes"),
        common::document(vec![(vec![text("Agenda")], vec![text("Lunch")])]),
    );
    docs.files
        .get_mut("api")
        .unwrap()
        .push(drive_file("d4", "AP002 - Gone"));
    docs.broken.insert("d4".to_string());
    let sheets = FakeSheets::with_sheets(&[(1, "Specs"), (2, "Specs_tmp")]);

    let report = Synchronizer::new(&docs, &sheets, config()).run().unwrap();

    assert_eq!(report.documents, 4);
    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 2);
    assert_eq!(sheets.appended("Specs_tmp").len(), 3);
    assert!(matches!(sheets.calls().last(), Some(SheetCall::Rename(_))));
}

#[test]
fn missing_staging_sheet_aborts_before_writing() {
    let docs = drive();
    let sheets = FakeSheets::with_sheets(&[(1, "Specs")]);

    let result = Synchronizer::new(&docs, &sheets, config()).run();

    assert!(matches!(result, Err(SpecsError::SheetNotFound(title)) if title == "Specs_tmp"));
    assert!(sheets.calls().is_empty());
}

#[test]
fn file_name_fills_missing_index_and_title() {
    let mut metadata = TableMetadata::new();
    metadata.insert(HeaderKey::Status, "Draft".to_string());

    fill_from_file_name(&mut metadata, "AB-12 - Retry budget");

    assert_eq!(metadata[&HeaderKey::Index], "AB-12");
    assert_eq!(metadata[&HeaderKey::Title], "Retry budget");
}

#[test]
fn file_name_never_overrides_the_table() {
    let mut metadata = TableMetadata::new();
    metadata.insert(HeaderKey::Index, "AB012".to_string());

    fill_from_file_name(&mut metadata, "XX999 - Other title");
    assert_eq!(metadata[&HeaderKey::Index], "AB012");
    assert_eq!(metadata[&HeaderKey::Title], "Other title");

    let mut untouched = TableMetadata::new();
    fill_from_file_name(&mut untouched, "Meeting notes");
    assert!(untouched.is_empty());
}
