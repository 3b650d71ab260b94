//! Builders for Drive `q` expressions and partial-response `fields` masks.

pub const MIME_TYPE_FOLDER: &str = "application/vnd.google-apps.folder";
pub const MIME_TYPE_DOCUMENT: &str = "application/vnd.google-apps.document";
pub const MIME_TYPE_HTML: &str = "text/html";

/// Builds a Drive search expression; clauses are joined with `and`.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    clauses: Vec<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mime_type(mut self, mime_type: &str) -> Self {
        self.clauses
            .push(format!("mimeType = '{}'", escape(mime_type)));
        self
    }

    pub fn is_folder(self) -> Self {
        self.mime_type(MIME_TYPE_FOLDER)
    }

    pub fn in_parent(mut self, parent_id: &str) -> Self {
        self.clauses.push(format!("'{}' in parents", escape(parent_id)));
        self
    }

    pub fn not_trashed(mut self) -> Self {
        self.clauses.push("trashed = false".to_string());
        self
    }

    pub fn build(self) -> String {
        self.clauses.join(" and ")
    }
}

/// Builds a `fields` mask such as `nextPageToken,files(id,name)`.
#[derive(Debug, Default)]
pub struct FieldBuilder {
    fields: Vec<String>,
}

impl FieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pagination(mut self) -> Self {
        self.fields.push("nextPageToken".to_string());
        self
    }

    pub fn field(mut self, name: &str) -> Self {
        self.fields.push(name.to_string());
        self
    }

    pub fn sub_fields(mut self, parent: &str, children: &[&str]) -> Self {
        self.fields
            .push(format!("{}({})", parent, children.join(",")));
        self
    }

    pub fn build(self) -> String {
        self.fields.join(",")
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_query_matches_drive_syntax() {
        let query = QueryBuilder::new()
            .is_folder()
            .in_parent("root123")
            .not_trashed()
            .build();
        assert_eq!(
            query,
            "mimeType = 'application/vnd.google-apps.folder' and 'root123' in parents and trashed = false"
        );
    }

    #[test]
    fn quotes_in_ids_are_escaped() {
        assert_eq!(QueryBuilder::new().in_parent("a'b").build(), "'a\\'b' in parents");
    }

    #[test]
    fn field_mask_with_pagination() {
        let fields = FieldBuilder::new()
            .pagination()
            .sub_fields("files", &["id", "name"])
            .build();
        assert_eq!(fields, "nextPageToken,files(id,name)");
    }
}
