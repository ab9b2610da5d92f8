//! CSV export.
//!
//! ```text
//! Organization,Job Title,Sector,Job type,Applied?,Location,On-site?,Job board,Core job responsibilities
//! Northwind Media,Video Editor,Editor,Unknown,No,Remote,Unknown,indeed,TBD
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{COLUMNS, JobRecord};
use crate::sinks::{DeliveryReceipt, RecordSink};

/// Writes records to a CSV file.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used for attachments.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "job_listings.csv".to_string())
    }

    /// Render header + one row per record, CRLF-terminated.
    pub fn render(records: &[JobRecord]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());
        writer.write_record(COLUMNS)?;
        for record in records {
            writer.write_record(record.to_row())?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for CsvExporter {
    async fn deliver(&self, records: &[JobRecord]) -> Result<DeliveryReceipt> {
        let bytes = Self::render(records)?;
        self.write_bytes(&bytes).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(DeliveryReceipt::new(
            records.len(),
            self.path.display().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OnSite;
    use tempfile::TempDir;

    fn sample(n: usize) -> Vec<JobRecord> {
        (0..n)
            .map(|i| {
                let mut record = JobRecord::blank("Editor", "indeed");
                record.title = format!("Editor {i}");
                record
            })
            .collect()
    }

    #[tokio::test]
    async fn test_export_has_header_plus_rows() {
        let tmp = TempDir::new().unwrap();
        let exporter = CsvExporter::new(tmp.path().join("out/job_listings.csv"));

        let receipt = exporter.deliver(&sample(3)).await.unwrap();
        assert_eq!(receipt.rows, 3);

        let text = std::fs::read_to_string(exporter.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], COLUMNS.join(","));
        assert_eq!(lines[1], "Unknown,Editor 0,Editor,Unknown,No,Unknown,Unknown,indeed,TBD");
    }

    #[tokio::test]
    async fn test_export_empty_is_header_only() {
        let tmp = TempDir::new().unwrap();
        let exporter = CsvExporter::new(tmp.path().join("empty.csv"));

        exporter.deliver(&[]).await.unwrap();
        let text = std::fs::read_to_string(exporter.path()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_render_quotes_and_utf8() {
        let mut record = JobRecord::blank("Producer", "remoteok");
        record.organization = "Smith, Jones & Co".to_string();
        record.location = "Zürich".to_string();
        record.on_site = OnSite::Yes;

        let text = String::from_utf8(CsvExporter::render(&[record]).unwrap()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("\"Smith, Jones & Co\","));
        assert!(row.contains("Zürich,Yes,remoteok"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(CsvExporter::new("/tmp/x/jobs.csv").file_name(), "jobs.csv");
    }
}
