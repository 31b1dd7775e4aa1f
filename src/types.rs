use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One spreadsheet record, keyed by column header.
///
/// Rows are read-only once built; their only identity is their position in
/// the sequence returned by a [`RowSource`](crate::app::ports::RowSource).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, Value>")]
pub struct Row(HashMap<String, String>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// Exported sheets carry numbers and booleans as JSON scalars; a null cell is
// an absent value.
impl From<HashMap<String, Value>> for Row {
    fn from(raw: HashMap<String, Value>) -> Self {
        raw.into_iter()
            .filter_map(|(column, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((column, text))
            })
            .collect()
    }
}

/// One accepted sitemap record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub location: String,
    pub last_modified: Option<String>,
}

/// Why a row did not become an [`Entry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Status,
    MissingUrl,
    Unreachable,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Status => "status",
            RejectReason::MissingUrl => "missing_url",
            RejectReason::Unreachable => "unreachable",
        }
    }
}

/// Counters for one filter pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub total: usize,
    pub accepted: usize,
    pub rejected_status: usize,
    pub rejected_missing_url: usize,
    pub rejected_unreachable: usize,
    pub unparsed_dates: usize,
}

impl FilterReport {
    pub fn record_rejection(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::Status => self.rejected_status += 1,
            RejectReason::MissingUrl => self.rejected_missing_url += 1,
            RejectReason::Unreachable => self.rejected_unreachable += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.rejected_status + self.rejected_missing_url + self.rejected_unreachable
    }
}
