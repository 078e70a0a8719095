use async_trait::async_trait;
use reqwest::{Method, Request, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::RemoteError;
use crate::fetch::{HttpClient, fetch_json, json_request};
use crate::services::sheets_api::SheetsApi;

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Google Sheets API v4 client.
///
/// Authentication is left to the wrapped [`HttpClient`], normally a
/// [`BearerAuth`](crate::fetch::auth::BearerAuth).
pub struct GoogleSheetsClient<C> {
    base_url: Url,
    http: C,
}

impl<C: HttpClient> GoogleSheetsClient<C> {
    pub fn new(http: C) -> Result<Self, RemoteError> {
        Self::with_base_url(http, SHEETS_BASE_URL)
    }

    pub fn with_base_url(http: C, base_url: &str) -> Result<Self, RemoteError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RemoteError::Protocol(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Protocol(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self { base_url, http })
    }

    /// `{base}/v4/spreadsheets/{segments...}`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["v4", "spreadsheets"])
                .extend(segments);
        }
        url
    }

    async fn send(&self, req: Request) -> Result<Value, RemoteError> {
        fetch_json(&self.http, req).await
    }
}

/// A1 range covering the row columns of `worksheet`.
fn row_range(worksheet: &str) -> String {
    format!("{}!A:H", quote_title(worksheet))
}

fn header_range(worksheet: &str) -> String {
    format!("{}!A1:H1", quote_title(worksheet))
}

// Sheet titles are quoted in A1 notation; embedded quotes are doubled.
fn quote_title(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl<C: HttpClient> SheetsApi for GoogleSheetsClient<C> {
    async fn create_spreadsheet(&self, title: &str) -> Result<String, RemoteError> {
        let body = json!({ "properties": { "title": title } });
        let req = json_request(Method::POST, self.url(&[]), &body)?;

        let created: CreatedSpreadsheet = fetch_json(&self.http, req).await?;
        Ok(created.spreadsheet_id)
    }

    async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, RemoteError> {
        let mut url = self.url(&[spreadsheet_id]);
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let meta: SpreadsheetMeta = fetch_json(&self.http, Request::new(Method::GET, url)).await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<(), RemoteError> {
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": cols }
                    }
                }
            }]
        });
        let segment = format!("{spreadsheet_id}:batchUpdate");
        let req = json_request(Method::POST, self.url(&[&segment]), &body)?;

        self.send(req).await?;
        Ok(())
    }

    async fn set_header(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        header: &[String],
    ) -> Result<(), RemoteError> {
        let range = header_range(worksheet);
        let mut url = self.url(&[spreadsheet_id, "values", &range]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({ "range": range, "majorDimension": "ROWS", "values": [header] });
        let req = json_request(Method::PUT, url, &body)?;

        self.send(req).await?;
        Ok(())
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        row: &[String],
    ) -> Result<(), RemoteError> {
        let range = row_range(worksheet);
        let segment = format!("{range}:append");
        let mut url = self.url(&[spreadsheet_id, "values", &segment]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = json!({ "majorDimension": "ROWS", "values": [row] });
        let req = json_request(Method::POST, url, &body)?;

        self.send(req).await?;
        Ok(())
    }

    async fn read_rows(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Vec<Vec<String>>, RemoteError> {
        let range = row_range(worksheet);
        let url = self.url(&[spreadsheet_id, "values", &range]);

        let values: ValueRange = fetch_json(&self.http, Request::new(Method::GET, url)).await?;
        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;

    fn client(base: &str) -> GoogleSheetsClient<BasicClient> {
        GoogleSheetsClient::with_base_url(BasicClient::new().unwrap(), base).unwrap()
    }

    #[test]
    fn test_url_building() {
        let c = client("https://sheets.googleapis.com");
        assert_eq!(
            c.url(&["abc", "values", "'bp_data'!A:H"]).as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'bp_data'!A:H"
        );
        assert_eq!(
            c.url(&[]).as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets"
        );
    }

    #[test]
    fn test_url_encodes_spaces_in_titles() {
        let c = client("http://127.0.0.1:8080/");
        let range = row_range("BP log");
        assert_eq!(
            c.url(&["abc", "values", &range]).as_str(),
            "http://127.0.0.1:8080/v4/spreadsheets/abc/values/'BP%20log'!A:H"
        );
    }

    #[test]
    fn test_quote_title_doubles_quotes() {
        assert_eq!(row_range("Bob's"), "'Bob''s'!A:H");
        assert_eq!(header_range("bp_data"), "'bp_data'!A1:H1");
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(json!("120")), "120");
        assert_eq!(cell_to_string(json!(120)), "120");
        assert_eq!(cell_to_string(json!(93.3)), "93.3");
        assert_eq!(cell_to_string(Value::Null), "");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(GoogleSheetsClient::with_base_url(BasicClient::new().unwrap(), "not a url").is_err());
        assert!(
            GoogleSheetsClient::with_base_url(BasicClient::new().unwrap(), "mailto:x@y").is_err()
        );
    }
}
