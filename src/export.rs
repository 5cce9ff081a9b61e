//! Plain-text export of a generated analysis.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportFile {
    pub filename: String,
    pub content: String,
}

impl ExportFile {
    /// Returns `None` when there is no narrative to export.
    pub fn from_analysis(analysis: &str, now: DateTime<Utc>) -> Option<Self> {
        if analysis.trim().is_empty() {
            return None;
        }

        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        Some(Self {
            filename: format!("token-analysis-{}.txt", timestamp),
            content: format!("{}\n\nAnalysis generated at: {}", analysis, timestamp),
        })
    }

    /// Value for a `Content-Disposition` header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}
