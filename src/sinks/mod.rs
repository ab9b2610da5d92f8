//! Delivery sinks for scraped records.
//!
//! Two tabular sinks implement [`RecordSink`]:
//! - `CsvExporter`: UTF-8 CSV file, header row first
//! - `SheetsSink`: hosted spreadsheet, contents replaced on every delivery
//!
//! `Notifier` sends the single notification mail once a sink has succeeded.

mod email;
mod export;
mod sheets;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::JobRecord;

pub use email::{Notification, Notifier};
pub use export::CsvExporter;
pub use sheets::{ServiceAccount, ServiceAccountKey, SheetsSink, TokenSource};

/// Metadata about a delivery.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// Data rows written (header excluded)
    pub rows: usize,
    /// Where the rows went: a file path or a spreadsheet id
    pub location: String,
    pub timestamp: DateTime<Utc>,
}

impl DeliveryReceipt {
    pub fn new(rows: usize, location: impl Into<String>) -> Self {
        Self {
            rows,
            location: location.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Trait for record delivery backends.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Deliver the full ordered record set, header first.
    async fn deliver(&self, records: &[JobRecord]) -> Result<DeliveryReceipt>;
}
