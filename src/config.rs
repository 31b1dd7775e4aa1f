use crate::constants::*;
use crate::error::{Result, SitemapError};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sheet: SheetConfig,
    pub filter: FilterConfig,
    pub liveness: LivenessConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub spreadsheet_id: Option<String>,
    pub api_base: String,
}

/// Which columns carry the sitemap fields and which statuses qualify a row
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub url_column: String,
    pub date_column: String,
    pub status_column: String,
    pub accepted_statuses: BTreeSet<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            api_base: DEFAULT_SHEETS_API_BASE.to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            url_column: DEFAULT_URL_COLUMN.to_string(),
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            status_column: DEFAULT_STATUS_COLUMN.to_string(),
            accepted_statuses: DEFAULT_ACCEPTED_STATUSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: DEFAULT_LIVENESS_TIMEOUT_SECS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl FilterConfig {
    pub fn accepts(&self, status: &str) -> bool {
        self.accepted_statuses.contains(status)
    }
}

impl Config {
    /// Load `path` (or the default `sitemap.toml` when absent), then apply
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                    Config::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SitemapError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from environment-style lookups. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(id) = get(ENV_SHEET_ID) {
            self.sheet.spreadsheet_id = Some(id);
        }
        if let Some(base) = get(ENV_SHEETS_API_BASE) {
            self.sheet.api_base = base;
        }
        if let Some(list) = get(ENV_ACCEPTED_STATUSES) {
            self.filter.accepted_statuses = list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(flag) = get(ENV_CHECK_LIVENESS) {
            self.liveness.enabled = parse_bool(&flag).ok_or_else(|| {
                SitemapError::Config(format!("{} must be true or false, got '{}'", ENV_CHECK_LIVENESS, flag))
            })?;
        }
        if let Some(path) = get(ENV_OUTPUT_PATH) {
            self.output.path = PathBuf::from(path);
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = port
                .parse()
                .map_err(|e| SitemapError::Config(format!("{} is not a valid port '{}': {}", ENV_PORT, port, e)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let columns = [
            ("filter.url_column", &self.filter.url_column),
            ("filter.date_column", &self.filter.date_column),
            ("filter.status_column", &self.filter.status_column),
        ];
        for (name, value) in columns {
            if value.trim().is_empty() {
                return Err(SitemapError::Config(format!("{} must not be empty", name)));
            }
        }
        if self.filter.accepted_statuses.is_empty() {
            return Err(SitemapError::Config(
                "filter.accepted_statuses must list at least one status".into(),
            ));
        }
        if self.liveness.timeout_secs == 0 {
            return Err(SitemapError::Config("liveness.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
