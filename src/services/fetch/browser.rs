// src/services/fetch/browser.rs

//! Rendered retrieval through one headless Chromium session.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::services::fetch::{Fetcher, RawDocument};

/// Navigates a shared headless browser to each URL and reads the rendered DOM.
///
/// The browser process is started by [`BrowserFetcher::launch`] and lives until
/// [`Fetcher::close`]. Dropping the fetcher without closing it still kills the
/// child process.
pub struct BrowserFetcher {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    settle: Duration,
}

impl BrowserFetcher {
    /// Launch the browser session.
    pub async fn launch(config: &CrawlerConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", config.user_agent));
        if let Some(secs) = config.timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        let browser_config = builder.build().map_err(AppError::config)?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        log::debug!("Headless browser started");

        Ok(Self {
            browser: Some(browser),
            handler: Some(handler),
            settle: Duration::from_millis(config.settle_ms),
        })
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<RawDocument> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| AppError::fetch(url, "browser session already closed"))?;

        let page = browser
            .new_page(url)
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        tokio::time::sleep(self.settle).await;

        let html = page.content().await.map_err(|e| AppError::fetch(url, e));
        if let Err(e) = page.close().await {
            log::debug!("Failed to close tab for {}: {}", url, e);
        }

        Ok(RawDocument::new(url, html?))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut browser) = self.browser.take() {
            browser.close().await?;
            browser.wait().await?;
            log::debug!("Headless browser stopped");
        }
        if let Some(handler) = self.handler.take() {
            let _ = handler.await;
        }
        Ok(())
    }
}
