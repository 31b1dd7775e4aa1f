use crate::app::ports::LivenessCheck;
use crate::config::FilterConfig;
use crate::pipeline::dates::parse_date;
use crate::types::{Entry, FilterReport, RejectReason, Row};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns spreadsheet rows into sitemap entries.
pub struct RowFilter {
    config: FilterConfig,
    liveness: Arc<dyn LivenessCheck>,
}

impl RowFilter {
    pub fn new(config: FilterConfig, liveness: Arc<dyn LivenessCheck>) -> Self {
        Self { config, liveness }
    }

    /// Keep the rows with an accepted status and a URL (optionally a live
    /// one), preserving input order.
    pub async fn filter_and_map(&self, rows: &[Row], check_liveness: bool) -> (Vec<Entry>, FilterReport) {
        let mut entries = Vec::new();
        let mut report = FilterReport {
            total: rows.len(),
            ..FilterReport::default()
        };

        for (index, row) in rows.iter().enumerate() {
            match self.map_row(row, check_liveness).await {
                Ok((entry, date_parsed)) => {
                    debug!(row = index, loc = %entry.location, lastmod = ?entry.last_modified, "Row accepted");
                    if !date_parsed {
                        report.unparsed_dates += 1;
                    }
                    entries.push(entry);
                }
                Err(reason) => {
                    debug!(row = index, reason = reason.as_str(), "Row rejected");
                    counter!("sitemap_rows_rejected_total", "reason" => reason.as_str()).increment(1);
                    report.record_rejection(reason);
                }
            }
        }

        report.accepted = entries.len();
        counter!("sitemap_rows_total").increment(report.total as u64);
        counter!("sitemap_entries_total").increment(report.accepted as u64);
        info!(
            "Filtered {} rows: {} accepted, {} rejected ({} wrong status, {} without URL, {} unreachable)",
            report.total,
            report.accepted,
            report.rejected(),
            report.rejected_status,
            report.rejected_missing_url,
            report.rejected_unreachable
        );
        (entries, report)
    }

    /// The flag is false when a date cell was present but not recognised.
    /// Status cells are compared as written, surrounding spaces included.
    async fn map_row(&self, row: &Row, check_liveness: bool) -> Result<(Entry, bool), RejectReason> {
        let status = row.get(&self.config.status_column).unwrap_or_default();
        if !self.config.accepts(status) {
            return Err(RejectReason::Status);
        }

        let location = row
            .get(&self.config.url_column)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(RejectReason::MissingUrl)?;

        if check_liveness && !self.liveness.is_live(location).await {
            warn!(url = %location, "Skipping unreachable URL");
            return Err(RejectReason::Unreachable);
        }

        let date = row
            .get(&self.config.date_column)
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_date);
        let date_parsed = date.as_ref().map_or(true, |d| d.is_canonical());

        let entry = Entry {
            location: location.to_string(),
            last_modified: date.map(|d| d.into_string()),
        };
        Ok((entry, date_parsed))
    }
}
