//! Service-account credential handling.
//!
//! The only accepted credential format is the base64 encoding of the JSON key
//! file downloaded from the cloud console. Raw JSON or any other shape is
//! refused with an error naming the stage that failed.

use crate::constants::DEFAULT_TOKEN_URI;
use crate::error::{Result, SitemapError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use std::fmt;

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    pub project_id: Option<String>,
    pub private_key_id: Option<String>,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
    pub token_uri: Option<String>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn client_email(&self) -> &str {
        self.client_email.as_deref().unwrap_or_default()
    }

    /// OAuth endpoint the signed assertion is exchanged at
    pub fn token_uri(&self) -> &str {
        self.token_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .unwrap_or(DEFAULT_TOKEN_URI)
    }

    /// RSA signing key parsed from the PEM in `private_key`.
    pub fn signing_key(&self) -> Result<EncodingKey> {
        let pem = self.private_key.as_deref().unwrap_or_default();
        EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| credentials_error("private_key", e.to_string()))
    }
}

pub(crate) fn credentials_error(stage: &'static str, message: impl Into<String>) -> SitemapError {
    SitemapError::Credentials {
        stage,
        message: message.into(),
    }
}

/// Decode and validate a base64 service-account blob. Whitespace and line
/// breaks inside the blob are ignored.
pub fn decode_credentials(blob: &str) -> Result<ServiceAccountKey> {
    let compact: String = blob.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(credentials_error("base64", "credential blob is empty"));
    }
    if compact.starts_with('{') {
        return Err(credentials_error(
            "base64",
            "credential blob looks like raw JSON; encode the key file with `encode-credentials` first",
        ));
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| credentials_error("base64", e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| credentials_error("utf-8", e.to_string()))?;
    let key: ServiceAccountKey =
        serde_json::from_str(&text).map_err(|e| credentials_error("json", e.to_string()))?;
    validate_key(&key)?;
    Ok(key)
}

fn validate_key(key: &ServiceAccountKey) -> Result<()> {
    match key.key_type.as_deref() {
        Some(SERVICE_ACCOUNT_TYPE) => {}
        Some(other) => {
            return Err(credentials_error(
                "field",
                format!("expected type \"{}\", got \"{}\"", SERVICE_ACCOUNT_TYPE, other),
            ))
        }
        None => return Err(credentials_error("field", "missing field \"type\"")),
    }
    if key.client_email.as_deref().map_or(true, |s| s.trim().is_empty()) {
        return Err(credentials_error("field", "missing field \"client_email\""));
    }
    if key.private_key.as_deref().map_or(true, |s| s.trim().is_empty()) {
        return Err(credentials_error("field", "missing field \"private_key\""));
    }
    key.signing_key()?;
    Ok(())
}

/// Produce the blob for a key file's contents, refusing anything that would
/// not decode back into a valid key.
pub fn encode_credentials(key_file: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(key_file).map_err(|e| credentials_error("utf-8", e.to_string()))?;
    let key: ServiceAccountKey =
        serde_json::from_str(text).map_err(|e| credentials_error("json", e.to_string()))?;
    validate_key(&key)?;
    Ok(STANDARD.encode(key_file))
}
