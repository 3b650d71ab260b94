//! Header-table metadata extraction.
//!
//! The extraction policy only sees a neutral projection of a document's first
//! table ([`StructuredBody`]), so the concrete document schema can change
//! without touching the rules below.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One paragraph element of a table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellElement {
    /// Plain text run.
    Text(String),
    /// Person mention chip, carrying the display name.
    Person(String),
    /// Anything else (links to other docs, equations, ...).
    Other,
}

/// The elements of the first paragraph of each cell of one table row.
pub type TableCells = Vec<Vec<CellElement>>;

/// A structured document body that may contain tables.
pub trait StructuredBody {
    /// Rows of the first table in the body, if any table exists.
    fn first_table(&self) -> Option<Vec<TableCells>>;
}

/// The header keys recognized in the metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeaderKey {
    Index,
    Title,
    Status,
    Authors,
    Type,
    Created,
}

impl HeaderKey {
    pub const ALL: [HeaderKey; 6] = [
        HeaderKey::Index,
        HeaderKey::Title,
        HeaderKey::Status,
        HeaderKey::Authors,
        HeaderKey::Type,
        HeaderKey::Created,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderKey::Index => "Index",
            HeaderKey::Title => "Title",
            HeaderKey::Status => "Status",
            HeaderKey::Authors => "Authors",
            HeaderKey::Type => "Type",
            HeaderKey::Created => "Created",
        }
    }
}

impl FromStr for HeaderKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeaderKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized header keys mapped to their extracted values.
pub type TableMetadata = BTreeMap<HeaderKey, String>;

/// Extract the recognized key/value pairs from the first table of `body`.
///
/// Returns an empty mapping when there is no table or when none of its rows
/// carries a recognized key. Rows that cannot be read (fewer than two cells,
/// empty value cell) are skipped.
pub fn parse_top_table<B: StructuredBody + ?Sized>(body: &B) -> TableMetadata {
    let mut metadata = TableMetadata::new();

    let Some(rows) = body.first_table() else {
        return metadata;
    };

    for cells in rows {
        if cells.len() < 2 {
            continue;
        }

        let Ok(key) = key_text(&cells[0]).parse::<HeaderKey>() else {
            continue;
        };

        if let Some(value) = value_text(&cells[1]) {
            metadata.insert(key, value);
        }
    }

    metadata
}

fn key_text(elements: &[CellElement]) -> String {
    let mut key = String::new();
    for element in elements {
        if let CellElement::Text(text) = element {
            key.push_str(text);
        }
    }
    key.trim().to_string()
}

fn value_text(elements: &[CellElement]) -> Option<String> {
    match elements {
        [] => None,
        [CellElement::Text(text)] | [CellElement::Person(text)] => Some(text.trim().to_string()),
        [CellElement::Other] => None,
        _ if elements.iter().all(|e| matches!(e, CellElement::Text(_))) => {
            // One logical value split over several runs, e.g. "Jan" + " 2024".
            let joined: String = elements
                .iter()
                .filter_map(|e| match e {
                    CellElement::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            Some(joined.trim().to_string())
        }
        _ => {
            // Mention chips: names are joined with no separator and plain
            // text in between is dropped.
            let names: String = elements
                .iter()
                .filter_map(|e| match e {
                    CellElement::Person(name) => Some(name.trim()),
                    _ => None,
                })
                .collect();
            Some(names)
        }
    }
}
