use std::collections::HashMap;
use std::collections::hash_map::Entry;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // "Name", "Name <mail>", "Name (mail)", "Name [mail]"
    static ref AUTHOR_REGEX: Regex = Regex::new(
        r"^(?P<name>.*?)\s*(?:[<(\[]\s*(?P<email>[^\s<>()\[\]]+@[^\s<>()\[\]]+)\s*[>)\]])?$"
    )
    .unwrap();
    static ref BARE_EMAIL_REGEX: Regex = Regex::new(r"^[^\s<>()\[\]]+@[^\s<>()\[\]]+$").unwrap();
}

/// Characters that separate authors in a freeform authors cell.
const SEPARATORS: [char; 5] = [',', ';', '/', '|', '\n'];

/// A person credited on a spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: &str, email: &str) -> Self {
        Author {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    /// Identity key: case-insensitive, whitespace-collapsed full name.
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }
}

pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parse a freeform authors string such as
/// `"Jane Doe, John Smith <john@x.com>"` into structured authors.
///
/// Tokens that are only a parenthesized note, e.g. `"(PjM)"`, are dropped.
/// A bare email address is used as both name and email.
pub fn parse_authors(raw: &str) -> Vec<Author> {
    let mut authors = Vec::new();

    for token in raw.split(&SEPARATORS[..]) {
        let token = token.trim();
        if token.is_empty() || (token.starts_with('(') && token.ends_with(')')) {
            continue;
        }

        if BARE_EMAIL_REGEX.is_match(token) {
            authors.push(Author::new(token, token));
            continue;
        }

        let Some(caps) = AUTHOR_REGEX.captures(token) else {
            continue;
        };
        let name = caps
            .name("name")
            .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        let email = caps.name("email").map(|m| m.as_str()).unwrap_or("");

        match (name.is_empty(), email.is_empty()) {
            (true, true) => continue,
            (true, false) => authors.push(Author::new(email, email)),
            _ => authors.push(Author::new(&name, email)),
        }
    }

    authors
}

/// Catalog-wide mapping from identity key to the canonical author.
#[derive(Debug, Default)]
pub struct AuthorIndex {
    by_key: HashMap<String, Author>,
}

impl AuthorIndex {
    /// Build the index. An entry carrying an email replaces one without;
    /// between two different emails the first one seen is kept.
    pub fn build<'a, I>(authors: I) -> Self
    where
        I: IntoIterator<Item = &'a Author>,
    {
        let mut by_key: HashMap<String, Author> = HashMap::new();
        for author in authors {
            match by_key.entry(author.key()) {
                Entry::Vacant(slot) => {
                    slot.insert(author.clone());
                }
                Entry::Occupied(mut slot) => {
                    if !slot.get().has_email() && author.has_email() {
                        slot.insert(author.clone());
                    }
                }
            }
        }
        AuthorIndex { by_key }
    }

    /// Resolve an author to the catalog's canonical identity
    ///
    /// # Arguments
    /// * `author` - An author as parsed from one spec
    ///
    /// # Returns
    /// * `Author` - The indexed author with the same key, or a copy of `author`
    ///   when the index has never seen that person
    pub fn canonical(&self, author: &Author) -> Author {
        self.by_key
            .get(&author.key())
            .cloned()
            .unwrap_or_else(|| author.clone())
    }

    /// Number of distinct people in the index
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Rewrite every author list with canonical identities, in original order,
/// dropping repeats of the same person within a list.
pub fn unify_authors(lists: &mut [Vec<Author>]) -> AuthorIndex {
    let index = AuthorIndex::build(lists.iter().flatten());

    for list in lists.iter_mut() {
        let mut seen = Vec::with_capacity(list.len());
        let mut unified = Vec::with_capacity(list.len());
        for author in list.iter() {
            let canonical = index.canonical(author);
            let key = canonical.key();
            if !seen.contains(&key) {
                seen.push(key);
                unified.push(canonical);
            }
        }
        *list = unified;
    }

    index
}
