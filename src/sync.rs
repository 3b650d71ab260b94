//! Full resynchronization of the tracking sheet from the document store.
//!
//! Rows are written to a staging sheet; the live sheet is only touched by the
//! final swap, which renames live -> `tmp`, staging -> live title and the old
//! live sheet -> staging title inside one batch update.

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::extractor::{HeaderKey, TableMetadata, parse_top_table};
use crate::google::{DocumentStore, DriveFile, SheetProperties, SheetRename, SheetStore};

/// Placeholder title the live sheet passes through during the swap.
pub const SWAP_TITLE: &str = "tmp";

pub const HEADERS: [&str; 13] = [
    "Folder name",
    "File name",
    "File ID",
    "File URL",
    "Index",
    "Title",
    "Status",
    "Authors",
    "Type",
    "Created",
    "Last updated",
    "Number of comments",
    "Number of open comments",
];

/// Where the synchronizer reads from and writes to.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Drive folder whose subfolders are the team folders
    pub root_folder_id: String,

    /// Title of the live sheet the listing is exported from
    pub specs_sheet_title: String,

    /// Title of the staging sheet rebuilt on every run, swapped live at the end
    pub tmp_sheet_title: String,
}

impl From<&Config> for SyncConfig {
    fn from(config: &Config) -> Self {
        SyncConfig {
            root_folder_id: config.teams_folder_id.clone(),
            specs_sheet_title: config.specs_sheet_title.clone(),
            tmp_sheet_title: config.tmp_sheet_title.clone(),
        }
    }
}

/// Outcome of one synchronization run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub folders: usize,
    pub documents: usize,
    pub written: usize,
    pub failed: usize,
    pub duration: Duration,
}

pub struct Synchronizer<'a, D: ?Sized, S: ?Sized> {
    docs: &'a D,
    sheets: &'a S,
    config: SyncConfig,
}

impl<'a, D, S> Synchronizer<'a, D, S>
where
    D: DocumentStore + ?Sized,
    S: SheetStore + ?Sized,
{
    /// Create a synchronizer over the given stores
    ///
    /// Nothing is read or written until [`Synchronizer::run`] is called.
    ///
    /// # Arguments
    /// * `docs` - Drive folders, documents and comments to read
    /// * `sheets` - The tracking spreadsheet to rebuild
    /// * `config` - Root folder and sheet titles
    ///
    /// # Returns
    /// * `Synchronizer` - Ready to run
    pub fn new(docs: &'a D, sheets: &'a S, config: SyncConfig) -> Self {
        Synchronizer {
            docs,
            sheets,
            config,
        }
    }

    /// Rebuild the staging sheet from every team folder, then swap it live.
    ///
    /// A document whose header table cannot be read or fetched is counted in
    /// [`SyncReport::failed`] and skipped. Any Drive listing or sheet write
    /// error aborts the run before the swap, leaving the live sheet untouched.
    ///
    /// # Returns
    /// * `Result<SyncReport>` - Counts and duration of the run
    pub fn run(&self) -> Result<SyncReport> {
        let started = Instant::now();
        log::info!(
            "starting specs synchronization from folder {}",
            self.config.root_folder_id
        );

        let live = self.sheets.sheet_by_title(&self.config.specs_sheet_title)?;
        let staging = self.sheets.sheet_by_title(&self.config.tmp_sheet_title)?;

        self.sheets.clear_sheet(&staging)?;
        let header: Vec<Value> = HEADERS.iter().map(|h| Value::from(*h)).collect();
        self.sheets
            .append_rows(&self.config.tmp_sheet_title, &[header])?;

        let mut report = SyncReport::default();
        let folders = self.docs.list_folders(&self.config.root_folder_id)?;
        report.folders = folders.len();

        for folder in &folders {
            let files = self.docs.list_documents(&folder.id)?;
            log::info!("processing folder '{}' ({} documents)", folder.name, files.len());

            for file in &files {
                report.documents += 1;
                match self.build_row(folder, file) {
                    Ok(Some(row)) => {
                        self.sheets
                            .append_rows(&self.config.tmp_sheet_title, &[row])?;
                        report.written += 1;
                    }
                    Ok(None) => {
                        log::warn!("unable to parse document: {}", file.name);
                        report.failed += 1;
                    }
                    Err(e) => {
                        log::warn!("unable to fetch document {}: {}", file.name, e);
                        report.failed += 1;
                    }
                }
            }
        }

        self.sheets.rename_sheets(&swap_renames(&live, &staging))?;

        report.duration = started.elapsed();
        log::info!(
            "specs synchronization completed in {:.1}s: {} documents, {} written, {} failed",
            report.duration.as_secs_f64(),
            report.documents,
            report.written,
            report.failed
        );
        Ok(report)
    }

    /// One sheet row for `file`, or `None` when its header table is unreadable.
    fn build_row(&self, folder: &DriveFile, file: &DriveFile) -> Result<Option<Vec<Value>>> {
        let comments = self.docs.list_comments(&file.id)?;
        let open_comments = comments.iter().filter(|c| !c.resolved).count();

        let document = self.docs.get_document(&file.id)?;
        let mut metadata = parse_top_table(&document);
        if metadata.is_empty() {
            return Ok(None);
        }
        fill_from_file_name(&mut metadata, &file.name);

        let field = |key: HeaderKey| -> Value {
            metadata
                .get(&key)
                .map(|v| Value::from(v.as_str()))
                .unwrap_or(Value::Null)
        };

        Ok(Some(vec![
            Value::from(folder.name.as_str()),
            Value::from(file.name.as_str()),
            Value::from(file.id.as_str()),
            Value::from(file.web_view_link.as_str()),
            field(HeaderKey::Index),
            field(HeaderKey::Title),
            field(HeaderKey::Status),
            field(HeaderKey::Authors),
            field(HeaderKey::Type),
            Value::from(file.created_time.as_str()),
            Value::from(file.modified_time.as_str()),
            Value::from(comments.len()),
            Value::from(open_comments),
        ]))
    }
}

/// The three renames of the swap, in the order they must apply.
pub fn swap_renames(live: &SheetProperties, staging: &SheetProperties) -> Vec<SheetRename> {
    vec![
        SheetRename {
            sheet_id: live.sheet_id,
            title: SWAP_TITLE.to_string(),
        },
        SheetRename {
            sheet_id: staging.sheet_id,
            title: live.title.clone(),
        },
        SheetRename {
            sheet_id: live.sheet_id,
            title: staging.title.clone(),
        },
    ]
}

/// Fill a missing index or title from a file name shaped `"<index> - <title>"`.
pub fn fill_from_file_name(metadata: &mut TableMetadata, file_name: &str) {
    let Some((index, title)) = file_name
        .split_once(" - ")
        .or_else(|| file_name.split_once('-'))
    else {
        return;
    };
    let (index, title) = (index.trim(), title.trim());
    if index.is_empty() || title.is_empty() {
        return;
    }
    metadata
        .entry(HeaderKey::Index)
        .or_insert_with(|| index.to_string());
    metadata
        .entry(HeaderKey::Title)
        .or_insert_with(|| title.to_string());
}
