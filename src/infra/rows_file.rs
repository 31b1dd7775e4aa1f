use crate::app::ports::RowSource;
use crate::error::Result;
use crate::types::Row;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Rows exported to a JSON file (an array of objects), for offline runs.
pub struct RowsFileSource {
    path: PathBuf,
}

impl RowsFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RowSource for RowsFileSource {
    async fn fetch_rows(&self) -> Result<Vec<Row>> {
        let content = tokio::fs::read(&self.path).await?;
        let rows: Vec<Row> = serde_json::from_slice(&content)?;
        debug!("Loaded {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("rows file {}", self.path.display())
    }
}
