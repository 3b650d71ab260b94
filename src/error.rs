use std::io;

use thiserror::Error;

/// Error type shared by the catalog, the synchronizer and the Google client.
#[derive(Debug, Error)]
pub enum SpecsError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("google api returned {status} for {endpoint}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed record on line {line} of {path}: {source}")]
    Record {
        path: String,
        line: usize,
        source: serde_json::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("no google access token configured")]
    MissingCredentials,
    #[error("sheet '{0}' not found in the tracking spreadsheet")]
    SheetNotFound(String),
    #[error("template error: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, SpecsError>;
