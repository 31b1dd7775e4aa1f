use crate::error::Result;
use crate::types::Row;
use async_trait::async_trait;

/// Supplies the spreadsheet rows for one run, in sheet order.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<Row>>;

    /// Short label for logs
    fn describe(&self) -> String;
}

/// Answers whether a URL currently serves a page.
///
/// Implementations never fail: any transport problem is reported as `false`.
#[async_trait]
pub trait LivenessCheck: Send + Sync {
    async fn is_live(&self, url: &str) -> bool;
}

/// Yields the bearer token sent with spreadsheet API calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}
