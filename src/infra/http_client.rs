use crate::app::ports::LivenessCheck;
use crate::constants::{BROWSER_ACCEPT, BROWSER_ACCEPT_LANGUAGE, BROWSER_USER_AGENT};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

const MAX_REDIRECTS: usize = 10;

/// Build a client that looks like a desktop browser: browser headers, a
/// cookie jar for challenge cookies, redirects followed.
pub fn browser_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));

    let client = reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .cookie_store(true)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Liveness probe over HTTP GET: live means a final status of exactly 200.
pub struct HttpLivenessChecker {
    client: reqwest::Client,
}

impl HttpLivenessChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(browser_client(timeout)?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LivenessCheck for HttpLivenessChecker {
    async fn is_live(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(resp) if resp.status() == StatusCode::OK => {
                debug!(url, "URL is live");
                true
            }
            Ok(resp) => {
                warn!(url, status = resp.status().as_u16(), "URL did not answer 200");
                false
            }
            Err(e) => {
                warn!(url, "URL check failed: {}", e);
                false
            }
        }
    }
}
