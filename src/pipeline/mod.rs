pub mod dates;
pub mod feed;
pub mod filter;

use crate::app::ports::{LivenessCheck, RowSource};
use crate::config::FilterConfig;
use crate::error::Result;
use crate::types::{FilterReport, Row};
use filter::RowFilter;
use metrics::{counter, histogram};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Bytes of one rendered sitemap, with the filter counters that produced it
#[derive(Debug, Clone)]
pub struct FeedOutput {
    pub xml: Vec<u8>,
    pub report: FilterReport,
}

/// Fetch rows, filter them, render the sitemap.
///
/// Holds no state between runs: every call re-reads the sheet and re-probes
/// every candidate URL.
pub struct Pipeline {
    source: Arc<dyn RowSource>,
    filter: RowFilter,
    check_liveness: bool,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn RowSource>,
        filter_config: FilterConfig,
        liveness: Arc<dyn LivenessCheck>,
        check_liveness: bool,
    ) -> Self {
        Self {
            source,
            filter: RowFilter::new(filter_config, liveness),
            check_liveness,
        }
    }

    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub async fn run(&self) -> Result<FeedOutput> {
        counter!("sitemap_runs_total").increment(1);
        let started = Instant::now();

        let rows = match self.source.fetch_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                counter!("sitemap_run_failures_total").increment(1);
                error!("Failed to fetch rows: {}", e);
                return Err(e);
            }
        };
        info!("Fetched {} rows", rows.len());

        let output = self.run_rows(&rows).await;
        histogram!("sitemap_run_duration_seconds").record(started.elapsed().as_secs_f64());
        output
    }

    /// Filter and render rows that were already fetched.
    pub async fn run_rows(&self, rows: &[Row]) -> Result<FeedOutput> {
        let (entries, report) = self.filter.filter_and_map(rows, self.check_liveness).await;
        let xml = feed::serialize(&entries)?;
        Ok(FeedOutput { xml, report })
    }

    /// File delivery: run, then overwrite `path` with the sitemap.
    pub async fn write_to(&self, path: &Path) -> Result<FeedOutput> {
        let output = self.run().await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &output.xml).await?;
        info!(
            "Wrote {} entries ({} bytes) to {}",
            output.report.accepted,
            output.xml.len(),
            path.display()
        );
        Ok(output)
    }
}
