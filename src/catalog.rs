use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::authors::{Author, normalize_name, unify_authors};
use crate::error::{Result, SpecsError};
use crate::spec::{CatalogSpec, SpecRecord};

/// The in-memory list of specs, loaded once at process start.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<SpecRecord>,
}

impl Catalog {
    /// Create a catalog over already loaded records
    ///
    /// # Arguments
    /// * `records` - Spec records, in the order they should be listed
    ///
    /// # Returns
    /// * `Catalog` - The catalog owning the records
    pub fn new(records: Vec<SpecRecord>) -> Self {
        Catalog { records }
    }

    /// Load the catalog from a JSON-lines export file.
    ///
    /// A missing file yields an empty catalog. Blank lines are ignored; a
    /// line that is not a valid record is an error naming the line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("{} not found, starting with an empty catalog", path.display());
                return Ok(Catalog::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| SpecsError::Record {
                path: path.display().to_string(),
                line: number + 1,
                source,
            })?;
            records.push(record);
        }

        log::info!("loaded {} specs from {}", records.len(), path.display());
        Ok(Catalog { records })
    }

    /// All records, in file order
    ///
    /// # Returns
    /// * `&[SpecRecord]` - The raw records, authors still unparsed
    pub fn records(&self) -> &[SpecRecord] {
        &self.records
    }

    /// Number of records in the catalog
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose index matches `code`, ignoring ASCII case.
    pub fn find_by_index(&self, code: &str) -> Option<&SpecRecord> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.records
            .iter()
            .find(|record| record.index.eq_ignore_ascii_case(code))
    }

    /// Sorted, distinct, non-empty team folder names.
    pub fn teams(&self) -> Vec<String> {
        distinct(self.records.iter().map(|record| record.folder_name.as_str()))
    }

    /// Sorted, distinct, non-empty status values.
    pub fn statuses(&self) -> Vec<String> {
        distinct(self.records.iter().map(|record| record.status.as_str()))
    }

    /// Sorted, distinct, non-empty spec types.
    pub fn types(&self) -> Vec<String> {
        distinct(self.records.iter().map(|record| record.spec_type.as_str()))
    }

    /// Every record with parsed authors, unified across the whole catalog.
    pub fn normalized(&self) -> Vec<CatalogSpec> {
        let mut specs: Vec<CatalogSpec> = self.records.iter().map(CatalogSpec::from_record).collect();
        let mut lists: Vec<Vec<Author>> = specs
            .iter_mut()
            .map(|spec| std::mem::take(&mut spec.authors))
            .collect();

        unify_authors(&mut lists);

        for (spec, authors) in specs.iter_mut().zip(lists) {
            spec.authors = authors;
        }
        specs
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, distinct names of every author in a normalized catalog.
pub fn author_names(specs: &[CatalogSpec]) -> Vec<String> {
    distinct(
        specs
            .iter()
            .flat_map(|spec| spec.authors.iter())
            .map(|author| author.name.as_str()),
    )
}

/// Specs crediting the given person, matched by full name or by email.
///
/// # Arguments
/// * `specs` - The normalized catalog
/// * `name` - Full name of the person; compared case and spacing insensitively
/// * `email` - Email of the person; compared case-insensitively
///
/// # Returns
/// * `Vec<&CatalogSpec>` - Matching specs, in catalog order
pub fn authored_by<'a>(specs: &'a [CatalogSpec], name: &str, email: &str) -> Vec<&'a CatalogSpec> {
    let name_key = normalize_name(name);
    specs
        .iter()
        .filter(|spec| {
            spec.authors.iter().any(|author| {
                (!name_key.is_empty() && author.key() == name_key)
                    || (!email.is_empty() && author.email.eq_ignore_ascii_case(email))
            })
        })
        .collect()
}

/// Listing filters, as taken from the query string.
///
/// Every field is optional; an empty field does not restrict the listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecFilter {
    /// Team folder name, matched case-insensitively as a substring
    pub team: String,

    /// Status, matched case-insensitively
    pub status: String,

    /// Spec type, matched exactly
    #[serde(rename = "type")]
    pub spec_type: String,

    /// Author name or email, matched case-insensitively as a substring
    pub author: String,

    /// Free text searched in the index, title, team and file name
    pub q: String,
}

impl SpecFilter {
    /// True when no field restricts the listing.
    pub fn is_empty(&self) -> bool {
        [&self.team, &self.status, &self.spec_type, &self.author, &self.q]
            .iter()
            .all(|value| value.trim().is_empty())
    }

    /// Check a spec against every non-empty field
    ///
    /// # Arguments
    /// * `spec` - A spec with unified authors
    ///
    /// # Returns
    /// * `bool` - True when the spec passes all filters
    pub fn matches(&self, spec: &CatalogSpec) -> bool {
        let team = self.team.trim().to_lowercase();
        if !team.is_empty() && !spec.folder_name.to_lowercase().contains(&team) {
            return false;
        }

        let status = self.status.trim();
        if !status.is_empty() && !spec.status.trim().eq_ignore_ascii_case(status) {
            return false;
        }

        let spec_type = self.spec_type.trim();
        if !spec_type.is_empty() && spec.spec_type.trim() != spec_type {
            return false;
        }

        let author = self.author.trim().to_lowercase();
        if !author.is_empty()
            && !spec.authors.iter().any(|a| {
                a.name.to_lowercase().contains(&author) || a.email.to_lowercase().contains(&author)
            })
        {
            return false;
        }

        let q = self.q.trim().to_lowercase();
        if !q.is_empty() {
            let found = [&spec.index, &spec.title, &spec.folder_name, &spec.file_name]
                .iter()
                .any(|field| field.to_lowercase().contains(&q));
            if !found {
                return false;
            }
        }

        true
    }

    /// Keep the specs passing this filter, in their original order.
    pub fn apply<'a, I>(&self, specs: I) -> Vec<&'a CatalogSpec>
    where
        I: IntoIterator<Item = &'a CatalogSpec>,
    {
        specs.into_iter().filter(|spec| self.matches(spec)).collect()
    }
}
