// src/models/record.rs

//! Normalized job posting record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder for any field that could not be extracted.
pub const UNKNOWN: &str = "Unknown";

/// Applied flag every record starts with.
pub const NOT_APPLIED: &str = "No";

/// Responsibilities placeholder when a board has no detail link.
pub const RESPONSIBILITIES_TBD: &str = "TBD";

/// Export column order, shared by every tabular sink.
pub const COLUMNS: [&str; 9] = [
    "Organization",
    "Job Title",
    "Sector",
    "Job type",
    "Applied?",
    "Location",
    "On-site?",
    "Job board",
    "Core job responsibilities",
];

/// Whether a posting requires on-site presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnSite {
    Yes,
    No,
    #[default]
    Unknown,
}

impl OnSite {
    /// Classify free text such as "Remote", "Hybrid" or "On-site".
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("remote") || lower.contains("anywhere") {
            OnSite::No
        } else if lower.contains("on-site")
            || lower.contains("onsite")
            || lower.contains("in-office")
            || lower.contains("in office")
        {
            OnSite::Yes
        } else {
            OnSite::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OnSite::Yes => "Yes",
            OnSite::No => "No",
            OnSite::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for OnSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job posting extracted from a board listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    /// Hiring organization
    pub organization: String,

    /// Posting title
    pub title: String,

    /// Search keyword that produced this record
    pub sector: String,

    /// Employment type (not extracted yet)
    pub job_type: String,

    /// Applied flag, always "No" at creation
    pub applied: String,

    /// Posting location
    pub location: String,

    /// On-site requirement
    pub on_site: OnSite,

    /// Identifier of the board the record was fetched from
    pub source_board: String,

    /// Detail link, or a placeholder
    pub responsibilities: String,
}

impl JobRecord {
    /// Start a record for a search, with every extracted field at its sentinel.
    pub fn blank(keyword: &str, board_id: &str) -> Self {
        Self {
            organization: UNKNOWN.to_string(),
            title: UNKNOWN.to_string(),
            sector: keyword.to_string(),
            job_type: UNKNOWN.to_string(),
            applied: NOT_APPLIED.to_string(),
            location: UNKNOWN.to_string(),
            on_site: OnSite::Unknown,
            source_board: board_id.to_string(),
            responsibilities: RESPONSIBILITIES_TBD.to_string(),
        }
    }

    /// Render the record as an export row, in `COLUMNS` order.
    pub fn to_row(&self) -> [&str; 9] {
        [
            self.organization.as_str(),
            self.title.as_str(),
            self.sector.as_str(),
            self.job_type.as_str(),
            self.applied.as_str(),
            self.location.as_str(),
            self.on_site.as_str(),
            self.source_board.as_str(),
            self.responsibilities.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_record_uses_sentinels() {
        let record = JobRecord::blank("Editor", "indeed");
        assert_eq!(record.sector, "Editor");
        assert_eq!(record.source_board, "indeed");
        assert_eq!(record.title, UNKNOWN);
        assert_eq!(record.job_type, UNKNOWN);
        assert_eq!(record.applied, "No");
        assert_eq!(record.on_site, OnSite::Unknown);
    }

    #[test]
    fn test_row_follows_column_order() {
        let mut record = JobRecord::blank("Producer", "remoteok");
        record.organization = "Acme".to_string();
        record.on_site = OnSite::No;

        let row = record.to_row();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[0], "Acme");
        assert_eq!(row[2], "Producer");
        assert_eq!(row[6], "No");
        assert_eq!(row[7], "remoteok");
    }

    #[test]
    fn test_on_site_classify() {
        assert_eq!(OnSite::classify("Remote in US"), OnSite::No);
        assert_eq!(OnSite::classify("On-site"), OnSite::Yes);
        assert_eq!(OnSite::classify("Hybrid"), OnSite::Unknown);
    }
}
