/// Shared names and defaults, kept in one place so the CLI, the config layer
/// and the server agree on them.

// Sitemap protocol
pub const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const SITEMAP_CONTENT_TYPE: &str = "application/xml";

// Spreadsheet columns used by the editorial team
pub const DEFAULT_URL_COLUMN: &str = "URL article";
pub const DEFAULT_DATE_COLUMN: &str = "Date de MEP";
pub const DEFAULT_STATUS_COLUMN: &str = "Statut";

/// Statuses that make a row eligible for the sitemap
pub const DEFAULT_ACCEPTED_STATUSES: &[&str] = &["Programmé", "Publié"];

// Delivery defaults
pub const DEFAULT_OUTPUT_PATH: &str = "sitemap.xml";
pub const DEFAULT_CONFIG_PATH: &str = "sitemap.toml";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LIVENESS_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

// Environment variables
pub const ENV_CREDENTIALS: &str = "GOOGLE_CREDENTIALS_JSON";
pub const ENV_SHEET_ID: &str = "SITEMAP_SHEET_ID";
pub const ENV_SHEETS_API_BASE: &str = "SITEMAP_SHEETS_API_BASE";
pub const ENV_ACCEPTED_STATUSES: &str = "SITEMAP_ACCEPTED_STATUSES";
pub const ENV_CHECK_LIVENESS: &str = "SITEMAP_CHECK_LIVENESS";
pub const ENV_OUTPUT_PATH: &str = "SITEMAP_OUTPUT";
pub const ENV_PORT: &str = "PORT";

// Service-account OAuth (JWT bearer grant)
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Browser identity presented by the liveness checker. Several publishing
/// platforms answer non-browser clients with a challenge page instead of 200.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
pub const BROWSER_ACCEPT_LANGUAGE: &str = "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7";
