//! Page fetching seam for the scraper.
//!
//! The scraper only needs "URL in, HTML out". Keeping that behind a trait
//! lets the rendered path use a different client (or a real headless
//! browser) and lets tests serve fixture pages.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::ScraperConfig;
use crate::utils::http::{create_async_client, create_browser_client, fetch_text};

/// Something that can turn a URL into an HTML body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Label used in logs.
    fn name(&self) -> &str;

    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain reqwest-backed fetcher.
pub struct HttpFetcher {
    name: &'static str,
    client: Client,
}

impl HttpFetcher {
    /// Lightweight fetcher with the plain tripkit user agent.
    pub fn lightweight(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            name: "http",
            client: create_async_client(config)?,
        })
    }

    /// Fetcher presenting a desktop browser profile, used for the rendered path.
    pub fn browser(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            name: "browser",
            client: create_browser_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        fetch_text(&self.client, url).await
    }
}
