// src/services/fetch/http.rs

//! Direct retrieval over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::services::fetch::{Fetcher, RawDocument};

/// Create a configured asynchronous HTTP client.
///
/// Requests carry no timeout unless `timeout_secs` is set.
pub fn create_client(config: &CrawlerConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(&config.user_agent);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Plain GET with a browser user agent.
///
/// The body is returned whatever the status code; an error page simply
/// parses to zero listings.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawDocument> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("{} answered {}; parsing body anyway", url, status);
        }

        let html = response.text().await.map_err(|e| AppError::fetch(url, e))?;
        Ok(RawDocument::new(url, html).with_status(status.as_u16()))
    }
}
