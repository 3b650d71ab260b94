use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::Config;
use crate::document::Document;
use crate::error::{Result, SpecsError};
use crate::google::query::{FieldBuilder, MIME_TYPE_DOCUMENT, MIME_TYPE_HTML, QueryBuilder};
use crate::google::{
    CellData, Comment, DocumentStore, DriveFile, SheetProperties, SheetRename, SheetRow,
    SheetStore,
};

const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
const DOCS_API: &str = "https://docs.googleapis.com/v1";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking client for the Drive, Docs and Sheets REST APIs.
#[derive(Clone)]
pub struct GoogleClient {
    http: Client,
    spreadsheet_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentList {
    #[serde(default)]
    comments: Vec<Comment>,
    next_page_token: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Spreadsheet {
    sheets: Vec<Sheet>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Sheet {
    properties: SheetProperties,
    data: Vec<GridData>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GridData {
    row_data: Vec<RowData>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RowData {
    values: Vec<CellData>,
}

impl GoogleClient {
    /// Build a client that authenticates every call with `access_token`.
    pub fn new(access_token: &str, spreadsheet_id: &str) -> Result<Self> {
        let token = access_token.trim();
        if token.is_empty() {
            return Err(SpecsError::MissingCredentials);
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| SpecsError::Config("access token is not a valid header".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(GoogleClient {
            http,
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config
            .google_access_token
            .as_deref()
            .ok_or(SpecsError::MissingCredentials)?;
        Self::new(token, &config.tracker_spreadsheet_id)
    }

    fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(SpecsError::Api {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self.send(self.http.get(url).query(query), url)?;
        Ok(response.json()?)
    }

    fn post_json(&self, url: &str, query: &[(&str, &str)], body: &Value) -> Result<Value> {
        let response = self.send(self.http.post(url).query(query).json(body), url)?;
        Ok(response.json()?)
    }

    /// List every file matching `query`, following pagination.
    fn list_files(&self, query: &str, fields: &[&str]) -> Result<Vec<DriveFile>> {
        let fields = FieldBuilder::new()
            .pagination()
            .sub_fields("files", fields)
            .build();
        let url = format!("{}/files", DRIVE_API);

        let mut files = Vec::new();
        let mut page_token = String::new();
        loop {
            let page: FileList = {
                let mut params = vec![
                    ("q", query),
                    ("fields", fields.as_str()),
                    ("pageSize", "1000"),
                    ("supportsAllDrives", "true"),
                    ("includeItemsFromAllDrives", "true"),
                ];
                if !page_token.is_empty() {
                    params.push(("pageToken", page_token.as_str()));
                }
                self.get_json(&url, &params)?
            };
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = token,
                _ => break,
            }
        }
        Ok(files)
    }

    fn batch_update(&self, requests: Vec<Value>) -> Result<()> {
        let url = format!("{}/{}:batchUpdate", SHEETS_API, self.spreadsheet_id);
        self.post_json(&url, &[], &json!({ "requests": requests }))?;
        Ok(())
    }
}

/// A1 range on a named sheet, quoting the name.
fn sheet_range(title: &str, range: &str) -> String {
    let quoted = format!("'{}'", title.replace('\'', "''"));
    if range.is_empty() {
        quoted
    } else {
        format!("{}!{}", quoted, range)
    }
}

impl DocumentStore for GoogleClient {
    fn list_folders(&self, parent_id: &str) -> Result<Vec<DriveFile>> {
        let query = QueryBuilder::new()
            .is_folder()
            .in_parent(parent_id)
            .not_trashed()
            .build();
        self.list_files(&query, &["id", "name"])
    }

    fn list_documents(&self, parent_id: &str) -> Result<Vec<DriveFile>> {
        let query = QueryBuilder::new()
            .mime_type(MIME_TYPE_DOCUMENT)
            .in_parent(parent_id)
            .not_trashed()
            .build();
        self.list_files(
            &query,
            &["id", "name", "createdTime", "modifiedTime", "webViewLink"],
        )
    }

    fn list_comments(&self, file_id: &str) -> Result<Vec<Comment>> {
        let url = format!("{}/files/{}/comments", DRIVE_API, urlencoding::encode(file_id));
        let fields = FieldBuilder::new()
            .pagination()
            .sub_fields("comments", &["resolved"])
            .build();

        let mut comments = Vec::new();
        let mut page_token = String::new();
        loop {
            let page: CommentList = {
                let mut params = vec![("fields", fields.as_str()), ("pageSize", "100")];
                if !page_token.is_empty() {
                    params.push(("pageToken", page_token.as_str()));
                }
                self.get_json(&url, &params)?
            };
            comments.extend(page.comments);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = token,
                _ => break,
            }
        }
        Ok(comments)
    }

    fn get_file(&self, file_id: &str) -> Result<DriveFile> {
        let url = format!("{}/files/{}", DRIVE_API, urlencoding::encode(file_id));
        self.get_json(
            &url,
            &[
                ("fields", "id,name,createdTime,modifiedTime,webViewLink"),
                ("supportsAllDrives", "true"),
            ],
        )
    }

    fn get_document(&self, document_id: &str) -> Result<Document> {
        let url = format!("{}/documents/{}", DOCS_API, urlencoding::encode(document_id));
        self.get_json(&url, &[])
    }

    fn export_html(&self, file_id: &str) -> Result<String> {
        let url = format!("{}/files/{}/export", DRIVE_API, urlencoding::encode(file_id));
        let response = self.send(
            self.http.get(&url).query(&[("mimeType", MIME_TYPE_HTML)]),
            &url,
        )?;
        Ok(response.text()?)
    }
}

impl SheetStore for GoogleClient {
    fn sheet_by_title(&self, title: &str) -> Result<SheetProperties> {
        let url = format!("{}/{}", SHEETS_API, self.spreadsheet_id);
        let spreadsheet: Spreadsheet =
            self.get_json(&url, &[("fields", "sheets.properties(sheetId,title)")])?;

        spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .find(|properties| properties.title == title)
            .ok_or_else(|| SpecsError::SheetNotFound(title.to_string()))
    }

    fn clear_sheet(&self, sheet: &SheetProperties) -> Result<()> {
        self.batch_update(vec![json!({
            "updateCells": {
                "range": { "sheetId": sheet.sheet_id },
                "fields": "userEnteredValue",
            }
        })])
    }

    fn append_rows(&self, title: &str, rows: &[Vec<Value>]) -> Result<()> {
        let url = format!(
            "{}/{}/values/{}:append",
            SHEETS_API,
            self.spreadsheet_id,
            urlencoding::encode(&sheet_range(title, ""))
        );
        self.post_json(
            &url,
            &[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")],
            &json!({ "values": rows }),
        )?;
        Ok(())
    }

    fn rename_sheets(&self, renames: &[SheetRename]) -> Result<()> {
        let requests = renames
            .iter()
            .map(|rename| {
                json!({
                    "updateSheetProperties": {
                        "properties": { "sheetId": rename.sheet_id, "title": rename.title },
                        "fields": "title",
                    }
                })
            })
            .collect();
        self.batch_update(requests)
    }

    fn read_rows(&self, title: &str, range: &str) -> Result<Vec<SheetRow>> {
        let url = format!("{}/{}", SHEETS_API, self.spreadsheet_id);
        let ranges = sheet_range(title, range);
        let spreadsheet: Spreadsheet = self.get_json(
            &url,
            &[
                ("ranges", ranges.as_str()),
                ("includeGridData", "true"),
                (
                    "fields",
                    "sheets(properties(sheetId,title),data(rowData(values(userEnteredValue,formattedValue))))",
                ),
            ],
        )?;

        let rows = spreadsheet
            .sheets
            .into_iter()
            .next()
            .and_then(|sheet| sheet.data.into_iter().next())
            .map(|grid| grid.row_data.into_iter().map(|row| row.values).collect())
            .unwrap_or_default();
        Ok(rows)
    }
}
