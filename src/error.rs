use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML write failed: {0}")]
    Xml(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid credentials ({stage}): {message}")]
    Credentials { stage: &'static str, message: String },

    #[error("Malformed worksheet: {0}")]
    Sheet(String),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, SitemapError>;
