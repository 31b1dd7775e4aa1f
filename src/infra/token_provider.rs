//! OAuth access tokens for the Sheets API, minted from the service-account
//! key with the JWT bearer grant.

use crate::app::ports::TokenProvider;
use crate::constants::{ASSERTION_LIFETIME_SECS, JWT_BEARER_GRANT_TYPE, SHEETS_SCOPE};
use crate::credentials::{credentials_error, ServiceAccountKey};
use crate::error::{Result, SitemapError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A cached token is replaced once it is this close to expiring
const REFRESH_MARGIN_SECS: i64 = 60;
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Signs an assertion with the service account's private key, exchanges it at
/// the key's `token_uri` and reuses the resulting token until shortly before
/// it expires.
pub struct ServiceAccountTokenProvider {
    client: reqwest::Client,
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(client: reqwest::Client, key: &ServiceAccountKey) -> Result<Self> {
        Ok(Self {
            client,
            client_email: key.client_email().to_string(),
            key_id: key.private_key_id.clone(),
            token_uri: key.token_uri().to_string(),
            signing_key: key.signing_key()?,
            cached: Mutex::new(None),
        })
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let header = Header {
            kid: self.key_id.clone(),
            ..Header::new(Algorithm::RS256)
        };
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| credentials_error("private_key", e.to_string()))
    }

    async fn request_token(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.signed_assertion(now)?;
        let resp = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SitemapError::Upstream {
                status: status.as_u16(),
                message: format!("token exchange refused: {}", body.chars().take(MAX_ERROR_BODY).collect::<String>()),
            });
        }

        let granted: TokenResponse = resp.json().await?;
        info!(client_email = %self.client_email, expires_in = granted.expires_in, "Obtained access token");
        Ok(CachedToken {
            token: granted.access_token,
            expires_at: now + Duration::seconds(granted.expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(current) = cached.as_ref() {
            if Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS) < current.expires_at {
                debug!("Reusing cached access token");
                return Ok(current.token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct StaticTokenProvider(String);

#[cfg(test)]
impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[cfg(test)]
#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
