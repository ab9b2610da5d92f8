// src/models/mod.rs

//! Domain models for the job scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod secrets;
mod selectors;
mod task;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, DeliveryConfig, DeliveryMode, EmailConfig, FetchFailurePolicy,
    FetchMode, OutputConfig, SheetConfig,
};
pub use record::{COLUMNS, JobRecord, NOT_APPLIED, OnSite, RESPONSIBILITIES_TBD, UNKNOWN};
pub use secrets::Secrets;
pub use selectors::{BoardConfig, BoardLayout, FieldSelectors, KEYWORD_SLOT};
pub use task::SearchTask;
