//! Drive, Docs and Sheets access.
//!
//! The rest of the crate talks to [`DocumentStore`] and [`SheetStore`];
//! [`GoogleClient`] implements both over the public REST APIs.

pub mod client;
pub mod query;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::Result;

pub use client::GoogleClient;

/// A Drive file or folder, restricted to the fields this crate asks for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub created_time: String,
    pub modified_time: String,
    pub web_view_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub resolved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// Give sheet `sheet_id` the title `title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRename {
    pub sheet_id: i64,
    pub title: String,
}

/// A value as typed into a cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtendedValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_entered_value: Option<ExtendedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_value: Option<String>,
}

/// One row of grid data; trailing empty cells may be absent.
pub type SheetRow = Vec<CellData>;

/// Source documents and their folder tree.
pub trait DocumentStore {
    /// Folders directly inside `parent_id`.
    fn list_folders(&self, parent_id: &str) -> Result<Vec<DriveFile>>;
    /// Non-trashed documents directly inside `parent_id`.
    fn list_documents(&self, parent_id: &str) -> Result<Vec<DriveFile>>;
    fn list_comments(&self, file_id: &str) -> Result<Vec<Comment>>;
    fn get_file(&self, file_id: &str) -> Result<DriveFile>;
    fn get_document(&self, document_id: &str) -> Result<Document>;
    fn export_html(&self, file_id: &str) -> Result<String>;
}

/// The tracking spreadsheet.
pub trait SheetStore {
    /// Look up a sheet of the tracking spreadsheet
    ///
    /// # Arguments
    /// * `title` - Exact sheet title
    ///
    /// # Returns
    /// * `Result<SheetProperties>` - The sheet's id and title, or
    ///   `SpecsError::SheetNotFound` when no sheet carries that title
    fn sheet_by_title(&self, title: &str) -> Result<SheetProperties>;

    /// Remove every value from a sheet, keeping the sheet itself
    ///
    /// # Arguments
    /// * `sheet` - The sheet to clear
    ///
    /// # Returns
    /// * `Result<()>` - Ok once the sheet is empty
    fn clear_sheet(&self, sheet: &SheetProperties) -> Result<()>;

    /// Append rows after the last non-empty row of a sheet
    ///
    /// # Arguments
    /// * `title` - Title of the target sheet
    /// * `rows` - Cell values, one inner vector per row, written as entered by a user
    ///
    /// # Returns
    /// * `Result<()>` - Ok once every row is written
    fn append_rows(&self, title: &str, rows: &[Vec<serde_json::Value>]) -> Result<()>;

    /// Apply every rename in order, as a single all-or-nothing update.
    ///
    /// # Arguments
    /// * `renames` - Sheet id and new title pairs
    ///
    /// # Returns
    /// * `Result<()>` - Ok when all renames took effect, an error when none did
    fn rename_sheets(&self, renames: &[SheetRename]) -> Result<()>;

    /// Grid data of `range` (A1 notation without the sheet name).
    ///
    /// # Arguments
    /// * `title` - Title of the sheet to read
    /// * `range` - Cell range such as `A2:N`
    ///
    /// # Returns
    /// * `Result<Vec<SheetRow>>` - Rows in sheet order; trailing empty cells may be absent
    fn read_rows(&self, title: &str, range: &str) -> Result<Vec<SheetRow>>;
}
