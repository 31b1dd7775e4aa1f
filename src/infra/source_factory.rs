use crate::app::ports::RowSource;
use crate::config::Config;
use crate::constants::ENV_CREDENTIALS;
use crate::credentials::{credentials_error, decode_credentials};
use crate::error::{Result, SitemapError};
use crate::infra::rows_file::RowsFileSource;
use crate::infra::sheets_client::SheetsApiSource;
use crate::infra::token_provider::ServiceAccountTokenProvider;
use std::path::PathBuf;
use std::sync::Arc;

/// Choose where rows come from. A rows file short-circuits everything else;
/// otherwise the credential blob and the spreadsheet id are validated here,
/// before any request leaves the process.
pub fn build_row_source(
    config: &Config,
    rows: Option<PathBuf>,
    credentials_blob: Option<&str>,
) -> Result<Arc<dyn RowSource>> {
    if let Some(path) = rows {
        return Ok(Arc::new(RowsFileSource::new(path)));
    }

    let blob = credentials_blob
        .ok_or_else(|| credentials_error("env", format!("environment variable {} is not set", ENV_CREDENTIALS)))?;
    let key = decode_credentials(blob)?;
    let spreadsheet_id = config.sheet.spreadsheet_id.clone().ok_or_else(|| {
        SitemapError::Config("sheet.spreadsheet_id (or SITEMAP_SHEET_ID) is required".into())
    })?;

    let client = reqwest::Client::new();
    let tokens = ServiceAccountTokenProvider::new(client.clone(), &key)?;
    Ok(Arc::new(SheetsApiSource::new(
        client,
        config.sheet.api_base.clone(),
        spreadsheet_id,
        Arc::new(tokens),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_PEM: &str = include_str!("../../tests/fixtures/service_account_key.pem");

    /// Every request reaching the server fails the test when it is dropped
    async fn untouchable_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        server
    }

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.sheet.spreadsheet_id = Some("sheet-1".into());
        config.sheet.api_base = server.uri();
        config
    }

    fn blob_for(server: &MockServer) -> String {
        STANDARD.encode(
            json!({
                "type": "service_account",
                "client_email": "sitemap@test.iam.gserviceaccount.com",
                "private_key": TEST_PEM,
                "token_uri": format!("{}/token", server.uri())
            })
            .to_string(),
        )
    }

    fn stage_of(result: Result<Arc<dyn RowSource>>) -> &'static str {
        match result {
            Err(SitemapError::Credentials { stage, .. }) => stage,
            Err(other) => panic!("expected a credentials error, got {other:?}"),
            Ok(source) => panic!("expected a credentials error, got {}", source.describe()),
        }
    }

    #[tokio::test]
    async fn raw_json_blob_fails_before_any_request() {
        let server = untouchable_server().await;
        let raw = r#"{"type": "service_account", "client_email": "a@b", "private_key": "k"}"#;

        assert_eq!(stage_of(build_row_source(&config_for(&server), None, Some(raw))), "base64");
    }

    #[tokio::test]
    async fn unreadable_private_key_fails_before_any_request() {
        let server = untouchable_server().await;
        let blob = STANDARD.encode(
            json!({
                "type": "service_account",
                "client_email": "a@b",
                "private_key": "not a pem",
                "token_uri": format!("{}/token", server.uri())
            })
            .to_string(),
        );

        assert_eq!(stage_of(build_row_source(&config_for(&server), None, Some(&blob))), "private_key");
    }

    #[tokio::test]
    async fn missing_blob_is_an_env_error() {
        let server = untouchable_server().await;
        assert_eq!(stage_of(build_row_source(&config_for(&server), None, None)), "env");
    }

    #[tokio::test]
    async fn missing_spreadsheet_id_is_a_config_error() {
        let server = untouchable_server().await;
        let mut config = config_for(&server);
        config.sheet.spreadsheet_id = None;

        let result = build_row_source(&config, None, Some(&blob_for(&server)));
        assert!(matches!(result, Err(SitemapError::Config(_))));
    }

    #[tokio::test]
    async fn valid_blob_builds_sheet_source_without_network() {
        let server = untouchable_server().await;
        let source = build_row_source(&config_for(&server), None, Some(&blob_for(&server))).unwrap();
        assert_eq!(source.describe(), "google sheet sheet-1");
    }

    #[tokio::test]
    async fn rows_file_wins_over_credentials() {
        let source = build_row_source(&Config::default(), Some(PathBuf::from("rows.json")), None).unwrap();
        assert!(source.describe().contains("rows.json"));
    }
}
