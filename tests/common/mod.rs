#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use specs::document::Document;
use specs::google::{
    CellData, Comment, DocumentStore, DriveFile, ExtendedValue, SheetProperties, SheetRename,
    SheetRow, SheetStore,
};
use specs::{Result, SpecsError};

pub fn text(content: &str) -> Value {
    json!({ "textRun": { "content": content } })
}

pub fn person(name: &str) -> Value {
    json!({ "person": { "personProperties": { "name": name, "email": "" } } })
}

/// A document whose first table has one row per `(key elements, value elements)`.
pub fn document(rows: Vec<(Vec<Value>, Vec<Value>)>) -> Document {
    let table_rows: Vec<Value> = rows
        .into_iter()
        .map(|(key, value)| {
            json!({
                "tableCells": [
                    { "content": [ { "paragraph": { "elements": key } } ] },
                    { "content": [ { "paragraph": { "elements": value } } ] },
                ]
            })
        })
        .collect();

    serde_json::from_value(json!({
        "documentId": "doc",
        "body": {
            "content": [
                { "paragraph": { "elements": [ text("Preamble\n") ] } },
                { "table": { "tableRows": table_rows } },
            ]
        }
    }))
    .expect("valid document json")
}

/// A document with the usual header table filled in.
pub fn spec_document(index: &str, title: &str, authors: &str) -> Document {
    document(vec![
        (vec![text("Index")], vec![text(index)]),
        (vec![text("Title")], vec![text(title)]),
        (vec![text("Status")], vec![text("Approved")]),
        (vec![text("Authors")], vec![text(authors)]),
        (vec![text("Type")], vec![text("Standard")]),
    ])
}

pub fn drive_file(id: &str, name: &str) -> DriveFile {
    DriveFile {
        id: id.to_string(),
        name: name.to_string(),
        created_time: "2024-01-01T00:00:00.000Z".to_string(),
        modified_time: "2024-02-01T00:00:00.000Z".to_string(),
        web_view_link: format!("https://docs.google.com/document/d/{}/edit", id),
    }
}

/// In-memory Drive: folders under one root, documents per folder.
#[derive(Default)]
pub struct FakeDocs {
    pub folders: Vec<DriveFile>,
    pub files: HashMap<String, Vec<DriveFile>>,
    pub documents: HashMap<String, Document>,
    pub comments: HashMap<String, Vec<Comment>>,
    pub broken: HashSet<String>,
    pub fetches: AtomicUsize,
}

impl FakeDocs {
    pub fn add_folder(&mut self, id: &str, name: &str) {
        self.folders.push(drive_file(id, name));
    }

    pub fn add_document(&mut self, folder_id: &str, file: DriveFile, document: Document) {
        self.documents.insert(file.id.clone(), document);
        self.files.entry(folder_id.to_string()).or_default().push(file);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lookup(&self, id: &str) -> Result<&Document> {
        if self.broken.contains(id) {
            return Err(SpecsError::Api {
                endpoint: format!("documents/{}", id),
                status: 500,
                body: "backend error".to_string(),
            });
        }
        self.documents.get(id).ok_or_else(|| SpecsError::Api {
            endpoint: format!("documents/{}", id),
            status: 404,
            body: "not found".to_string(),
        })
    }
}

impl DocumentStore for FakeDocs {
    fn list_folders(&self, _parent_id: &str) -> Result<Vec<DriveFile>> {
        Ok(self.folders.clone())
    }

    fn list_documents(&self, parent_id: &str) -> Result<Vec<DriveFile>> {
        Ok(self.files.get(parent_id).cloned().unwrap_or_default())
    }

    fn list_comments(&self, file_id: &str) -> Result<Vec<Comment>> {
        Ok(self.comments.get(file_id).cloned().unwrap_or_default())
    }

    fn get_file(&self, file_id: &str) -> Result<DriveFile> {
        self.lookup(file_id)?;
        Ok(drive_file(file_id, file_id))
    }

    fn get_document(&self, document_id: &str) -> Result<Document> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.lookup(document_id).cloned()
    }

    fn export_html(&self, file_id: &str) -> Result<String> {
        self.lookup(file_id)?;
        Ok(format!("<p>{}</p>", file_id))
    }
}

/// Every call made against [`FakeSheets`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCall {
    Clear(String),
    Append(String, Vec<Vec<Value>>),
    Rename(Vec<SheetRename>),
}

#[derive(Default)]
pub struct FakeSheets {
    pub sheets: Vec<SheetProperties>,
    pub rows: Vec<SheetRow>,
    pub calls: Mutex<Vec<SheetCall>>,
}

impl FakeSheets {
    pub fn with_sheets(titles: &[(i64, &str)]) -> Self {
        FakeSheets {
            sheets: titles
                .iter()
                .map(|(id, title)| SheetProperties {
                    sheet_id: *id,
                    title: title.to_string(),
                })
                .collect(),
            ..FakeSheets::default()
        }
    }

    pub fn calls(&self) -> Vec<SheetCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Rows appended to `title`, header included.
    pub fn appended(&self, title: &str) -> Vec<Vec<Value>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SheetCall::Append(t, rows) if t == title => Some(rows),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

impl SheetStore for FakeSheets {
    fn sheet_by_title(&self, title: &str) -> Result<SheetProperties> {
        self.sheets
            .iter()
            .find(|s| s.title == title)
            .cloned()
            .ok_or_else(|| SpecsError::SheetNotFound(title.to_string()))
    }

    fn clear_sheet(&self, sheet: &SheetProperties) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SheetCall::Clear(sheet.title.clone()));
        Ok(())
    }

    fn append_rows(&self, title: &str, rows: &[Vec<Value>]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SheetCall::Append(title.to_string(), rows.to_vec()));
        Ok(())
    }

    fn rename_sheets(&self, renames: &[SheetRename]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SheetCall::Rename(renames.to_vec()));
        Ok(())
    }

    fn read_rows(&self, _title: &str, _range: &str) -> Result<Vec<SheetRow>> {
        Ok(self.rows.clone())
    }
}

pub fn string_cell(value: &str) -> CellData {
    CellData {
        user_entered_value: Some(ExtendedValue {
            string_value: Some(value.to_string()),
            ..ExtendedValue::default()
        }),
        formatted_value: Some(value.to_string()),
    }
}

pub fn number_cell(value: f64) -> CellData {
    CellData {
        user_entered_value: Some(ExtendedValue {
            number_value: Some(value),
            ..ExtendedValue::default()
        }),
        formatted_value: Some(value.to_string()),
    }
}
