// src/pipeline/deliver.rs

//! Delivery stage: hand the ordered records to the configured sink, then mail.
//!
//! A sink failure aborts before any mail is sent.

use chrono::{Local, NaiveDate};

use crate::error::{AppError, Result};
use crate::models::{Config, DeliveryMode, JobRecord, Secrets};
use crate::services::fetch::create_client;
use crate::sinks::{
    CsvExporter, DeliveryReceipt, Notification, Notifier, RecordSink, ServiceAccount,
    ServiceAccountKey, SheetsSink,
};
use crate::utils::log;

/// Build the sink selected by `[delivery].mode`.
pub fn build_sink(config: &Config, secrets: &Secrets) -> Result<Box<dyn RecordSink>> {
    match config.delivery.mode {
        DeliveryMode::Csv => Ok(Box::new(CsvExporter::new(&config.output.csv_path))),
        DeliveryMode::Sheet => {
            let json = secrets.google_credentials_json.as_deref().ok_or_else(|| {
                AppError::config("GOOGLE_CREDENTIALS_JSON must be set for sheet delivery")
            })?;
            let key = ServiceAccountKey::from_json(json)?;
            let client = create_client(&config.crawler)?;
            Ok(Box::new(SheetsSink::new(
                client,
                config.sheet.clone(),
                ServiceAccount::new(key),
            )))
        }
    }
}

/// The mail announcing a finished delivery.
pub fn notification(config: &Config, records: &[JobRecord], date: NaiveDate) -> Result<Notification> {
    Ok(match config.delivery.mode {
        DeliveryMode::Csv => {
            let exporter = CsvExporter::new(&config.output.csv_path);
            Notification::results(date, exporter.file_name(), CsvExporter::render(records)?)
        }
        DeliveryMode::Sheet => Notification::summary(date, records.len(), &config.sheet.name),
    })
}

/// Line printed once everything has gone out.
pub fn completion_message(mode: DeliveryMode, count: usize) -> String {
    match mode {
        DeliveryMode::Csv => format!("{count} jobs scraped and CSV emailed."),
        DeliveryMode::Sheet => format!("{count} jobs scraped and updated."),
    }
}

/// Deliver the records, then send the notification unless `notify` is off.
pub async fn run_delivery(
    config: &Config,
    secrets: &Secrets,
    records: &[JobRecord],
    notify: bool,
) -> Result<DeliveryReceipt> {
    let sink = build_sink(config, secrets)?;
    let receipt = sink.deliver(records).await?;
    log::success(&format!("{} rows delivered to {}", receipt.rows, receipt.location));

    if notify {
        let note = notification(config, records, Local::now().date_naive())?;
        Notifier::new(&config.email, secrets)?.send(&note).await?;
    }

    Ok(receipt)
}
