// src/services/fetch/mod.rs

//! Page retrieval.
//!
//! Two interchangeable strategies sit behind [`Fetcher`]: a direct HTTP GET
//! and (with the `browser` feature) a headless Chromium session. Both hand
//! back a [`RawDocument`] that parsers read the same way.

#[cfg(feature = "browser")]
mod browser;
mod http;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use http::{HttpFetcher, create_client};

use async_trait::async_trait;
use scraper::Html;

use crate::error::Result;
use crate::models::{CrawlerConfig, FetchMode};

/// A retrieved page, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// URL the page was requested from
    pub url: String,

    /// Page markup
    pub html: String,

    /// HTTP status, when the strategy exposes one
    pub status: Option<u16>,
}

impl RawDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Parse into a queryable document.
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Retrieves board pages.
///
/// A fetcher owns whatever session it needs. [`Fetcher::close`] releases it and
/// is called once by the pipeline after the last fetch, on success or failure.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawDocument>;

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Build the fetcher selected by configuration.
pub async fn create_fetcher(config: &CrawlerConfig) -> Result<Box<dyn Fetcher>> {
    match config.fetch_mode {
        FetchMode::Direct => Ok(Box::new(HttpFetcher::new(config)?)),
        #[cfg(feature = "browser")]
        FetchMode::Rendered => Ok(Box::new(BrowserFetcher::launch(config).await?)),
        #[cfg(not(feature = "browser"))]
        FetchMode::Rendered => Err(crate::error::AppError::config(
            "fetch_mode = \"rendered\" requires the `browser` feature",
        )),
    }
}
