//! Google Sheets v4 reader: every worksheet of one spreadsheet, first row as
//! header.

use crate::app::ports::{RowSource, TokenProvider};
use crate::error::{Result, SitemapError};
use crate::types::Row;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Longest upstream error body kept in an error message
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsApiSource {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SheetsApiSource {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        }
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.api_base, self.spreadsheet_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        let resp = self.client.get(url).bearer_auth(token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SitemapError::Upstream {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        Ok(resp.json::<T>().await?)
    }

    async fn worksheet_titles(&self, token: &str) -> Result<Vec<String>> {
        let url = format!("{}?fields=sheets.properties.title", self.spreadsheet_url());
        let meta: SpreadsheetMeta = self.get_json(&url, token).await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn worksheet_rows(&self, title: &str, token: &str) -> Result<Vec<Row>> {
        let url = format!("{}/values/{}", self.spreadsheet_url(), urlencoding::encode(&a1_sheet_range(title)));
        let range: ValueRange = self.get_json(&url, token).await?;
        records_from_values(title, &range.values)
    }
}

#[async_trait]
impl RowSource for SheetsApiSource {
    #[instrument(skip(self), fields(spreadsheet = %self.spreadsheet_id))]
    async fn fetch_rows(&self) -> Result<Vec<Row>> {
        let token = self.tokens.access_token().await?;
        let token = token.as_str();

        let titles = self.worksheet_titles(token).await?;
        info!("Found {} worksheets", titles.len());

        let mut rows = Vec::new();
        for title in &titles {
            let sheet_rows = self.worksheet_rows(title, token).await?;
            debug!(worksheet = %title, rows = sheet_rows.len(), "Read worksheet");
            rows.extend(sheet_rows);
        }
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("google sheet {}", self.spreadsheet_id)
    }
}

/// A1 range covering a whole worksheet: the title in single quotes, inner
/// quotes doubled.
fn a1_sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Header row to column names, one [`Row`] per following non-blank line.
/// Cells missing at the end of a short line read as empty strings. A header
/// naming the same column twice is refused.
pub fn records_from_values(worksheet: &str, values: &[Vec<Value>]) -> Result<Vec<Row>> {
    let Some((header, body)) = values.split_first() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header.iter().map(|c| cell_text(c).trim().to_string()).collect();

    let mut seen = HashSet::new();
    if let Some(duplicate) = header.iter().filter(|name| !name.is_empty()).find(|name| !seen.insert(*name)) {
        return Err(SitemapError::Sheet(format!(
            "worksheet '{}' has more than one column named '{}'",
            worksheet, duplicate
        )));
    }

    let rows = body
        .iter()
        .filter(|line| line.iter().any(|c| !cell_text(c).trim().is_empty()))
        .map(|line| {
            header
                .iter()
                .enumerate()
                .filter(|(_, name)| !name.is_empty())
                .map(|(i, name)| (name.clone(), line.get(i).map(cell_text).unwrap_or_default()))
                .collect::<Row>()
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::token_provider::StaticTokenProvider;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn values(v: Value) -> Vec<Vec<Value>> {
        serde_json::from_value(v).unwrap()
    }

    fn source(server: &MockServer) -> SheetsApiSource {
        SheetsApiSource::new(
            reqwest::Client::new(),
            server.uri(),
            "sheet-1",
            Arc::new(StaticTokenProvider::new("tok")),
        )
    }

    #[test]
    fn header_names_the_columns() {
        let rows = records_from_values("Janvier", &values(json!([
            ["Statut", "URL article", "Date de MEP"],
            ["Publié", "https://a.test/x", "01/01/2025"],
            ["Brouillon", "https://a.test/y"],
        ])))
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("URL article"), Some("https://a.test/x"));
        assert_eq!(rows[1].get("Date de MEP"), Some(""));
    }

    #[test]
    fn blank_lines_and_unnamed_columns_are_skipped() {
        let rows = records_from_values("Janvier", &values(json!([
            ["Statut", "", "URL article"],
            ["", "", ""],
            [],
            ["Publié", "note", "https://a.test/x"],
            ["Publié", 3, 4.5],
        ])))
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(""), None);
        assert_eq!(rows[0].get("Statut"), Some("Publié"));
        assert_eq!(rows[1].get("URL article"), Some("4.5"));
    }

    #[test]
    fn empty_sheet_has_no_rows() {
        assert!(records_from_values("Vide", &[]).unwrap().is_empty());
        assert!(records_from_values("Vide", &values(json!([["Statut"]]))).unwrap().is_empty());
    }

    #[test]
    fn repeated_column_name_is_refused() {
        let err = records_from_values(
            "Mars",
            &values(json!([
                ["Statut", "URL article", " Statut "],
                ["Publié", "https://a.test/x", "Brouillon"],
            ])),
        )
        .unwrap_err();

        match err {
            SitemapError::Sheet(message) => {
                assert!(message.contains("Mars"));
                assert!(message.contains("Statut"));
            }
            other => panic!("expected a worksheet error, got {other:?}"),
        }
    }

    #[test]
    fn several_unnamed_columns_are_not_duplicates() {
        let rows = records_from_values("Avril", &values(json!([["", "URL article", ""], ["a", "https://a.test/x", "b"]])))
            .unwrap();
        assert_eq!(rows[0].get("URL article"), Some("https://a.test/x"));
    }

    #[test]
    fn sheet_titles_are_quoted_for_a1() {
        assert_eq!(a1_sheet_range("Janvier"), "'Janvier'");
        assert_eq!(a1_sheet_range("L'équipe"), "'L''équipe'");
    }

    #[tokio::test]
    async fn reads_every_worksheet_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-1"))
            .and(query_param("fields", "sheets.properties.title"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sheets": [
                    {"properties": {"title": "Janvier"}},
                    {"properties": {"title": "Février"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-1/values/%27Janvier%27"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Janvier!A1:C2",
                "values": [["Statut", "URL article"], ["Publié", "https://a.test/1"]]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-1/values/%27F%C3%A9vrier%27"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Février!A1:C2",
                "values": [["Statut", "URL article"], ["Programmé", "https://a.test/2"]]
            })))
            .mount(&server)
            .await;

        let rows = source(&server).fetch_rows().await.unwrap();

        let urls: Vec<_> = rows.iter().filter_map(|r| r.get("URL article")).collect();
        assert_eq!(urls, ["https://a.test/1", "https://a.test/2"]);
    }

    #[tokio::test]
    async fn worksheet_without_values_yields_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sheets": [{"properties": {"title": "Vide"}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-1/values/%27Vide%27"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"range": "Vide!A1:Z1000"})))
            .mount(&server)
            .await;

        assert!(source(&server).fetch_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn forbidden_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("The caller does not have permission"))
            .mount(&server)
            .await;

        let err = source(&server).fetch_rows().await.unwrap_err();
        match err {
            SitemapError::Upstream { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("permission"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
