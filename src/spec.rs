use serde::{Deserialize, Serialize};

use crate::authors::{Author, parse_authors};
use crate::error::Result;
use crate::extractor::{TableMetadata, parse_top_table};
use crate::google::DocumentStore;

/// One tracked design document, as exported from the tracking sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecRecord {
    pub folder_name: String,
    pub file_name: String,
    #[serde(rename = "fileID")]
    pub file_id: String,
    #[serde(rename = "fileURL")]
    pub file_url: String,
    pub index: String,
    pub title: String,
    pub status: String,
    pub authors: String,
    #[serde(rename = "type")]
    pub spec_type: String,
    pub created: String,
    pub last_updated: String,
    pub number_of_comments: u32,
    pub open_comments: u32,
}

/// A spec record whose authors have been parsed and unified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSpec {
    pub folder_name: String,
    pub file_name: String,
    #[serde(rename = "fileID")]
    pub file_id: String,
    #[serde(rename = "fileURL")]
    pub file_url: String,
    pub index: String,
    pub title: String,
    pub status: String,
    pub authors: Vec<Author>,
    #[serde(rename = "type")]
    pub spec_type: String,
    pub created: String,
    pub last_updated: String,
    pub number_of_comments: u32,
    pub open_comments: u32,
}

impl CatalogSpec {
    /// Parse the raw authors string; unification happens catalog-wide later.
    pub fn from_record(record: &SpecRecord) -> Self {
        CatalogSpec {
            folder_name: record.folder_name.clone(),
            file_name: record.file_name.clone(),
            file_id: record.file_id.clone(),
            file_url: record.file_url.clone(),
            index: record.index.clone(),
            title: record.title.clone(),
            status: record.status.clone(),
            authors: parse_authors(&record.authors),
            spec_type: record.spec_type.clone(),
            created: record.created.clone(),
            last_updated: record.last_updated.clone(),
            number_of_comments: record.number_of_comments,
            open_comments: record.open_comments,
        }
    }
}

/// Payload of the detail endpoint: header metadata plus rendered HTML.
#[derive(Debug, Clone, Serialize)]
pub struct SpecDetails {
    pub metadata: TableMetadata,
    pub url: String,
    pub html: String,
}

impl SpecDetails {
    /// Fetch one document's body, link and HTML rendering.
    pub fn fetch<S: DocumentStore + ?Sized>(store: &S, document_id: &str) -> Result<Self> {
        let document = store.get_document(document_id)?;
        let file = store.get_file(document_id)?;
        let html = store.export_html(document_id)?;

        Ok(SpecDetails {
            metadata: parse_top_table(&document),
            url: file.web_view_link,
            html,
        })
    }
}
