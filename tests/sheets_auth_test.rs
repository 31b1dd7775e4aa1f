use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use sheet_sitemap::config::Config;
use sheet_sitemap::infra::source_factory::build_row_source;
use sheet_sitemap::infra::static_liveness::StaticLiveness;
use sheet_sitemap::pipeline::Pipeline;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_PEM: &str = include_str!("fixtures/service_account_key.pem");

fn credentials_blob(server: &MockServer) -> String {
    STANDARD.encode(
        json!({
            "type": "service_account",
            "project_id": "editorial-sitemap",
            "private_key_id": "kid-1",
            "private_key": TEST_PEM,
            "client_email": "sitemap@editorial-sitemap.iam.gserviceaccount.com",
            "token_uri": format!("{}/oauth2/token", server.uri())
        })
        .to_string(),
    )
}

async fn mount_sheet(server: &MockServer, bearer: &str) {
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/editorial"))
        .and(header("authorization", bearer))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sheets": [{"properties": {"title": "Articles"}}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/editorial/values/%27Articles%27"))
        .and(header("authorization", bearer))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [
                ["Statut", "URL article", "Date de MEP"],
                ["Publié", "https://a.test/x", "01/01/2025"],
                ["Brouillon", "https://b.test/y", ""]
            ]
        })))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.sheet.spreadsheet_id = Some("editorial".into());
    config.sheet.api_base = server.uri();
    config
}

#[tokio::test]
async fn sheet_requests_carry_the_minted_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant-type%3Ajwt-bearer"))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.from-token-endpoint",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_sheet(&server, "Bearer ya29.from-token-endpoint").await;

    let source = build_row_source(&config_for(&server), None, Some(&credentials_blob(&server)))?;
    let pipeline = Pipeline::new(source, Config::default().filter, Arc::new(StaticLiveness::AllLive), false);

    // second run reuses the cached token
    for _ in 0..2 {
        let feed = pipeline.run().await?;
        let xml = String::from_utf8(feed.xml)?;
        assert!(xml.contains("<loc>https://a.test/x</loc>"));
        assert!(xml.contains("<lastmod>2025-01-01</lastmod>"));
        assert!(!xml.contains("https://b.test/y"));
    }
    Ok(())
}

#[tokio::test]
async fn refused_token_exchange_fails_the_run() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = build_row_source(&config_for(&server), None, Some(&credentials_blob(&server)))?;
    let pipeline = Pipeline::new(source, Config::default().filter, Arc::new(StaticLiveness::AllLive), false);

    let err = pipeline.run().await.unwrap_err();
    assert!(err.to_string().contains("401"));
    Ok(())
}
