//! HTTP access to the scans service.

use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::warn;

use crate::config::ProviderConfig;
use crate::error::Result;

/// The two kinds of GET the pipeline issues.
///
/// Errors are returned to the caller untouched; nothing here retries.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// GET a text body (image listings)
    async fn get_text(&self, url: &str) -> Result<String>;

    /// GET a raw body (page images)
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// `Fetch` over a real HTTP client
#[derive(Clone)]
pub struct ScanClient {
    client: Client,
}

impl ScanClient {
    pub fn new(provider: &ProviderConfig) -> Result<Self> {
        let builder = Client::builder()
            .user_agent(provider.user_agent.as_str())
            .timeout(Duration::from_secs(provider.timeout_secs));

        let builder = match &provider.proxy {
            Some(proxy) => builder.proxy(Proxy::all(proxy.as_str())?),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            // Body is still used: the service reports missing boreholes in the body
            warn!("GET {} returned status {}", url, response.status());
        }
        Ok(response)
    }
}

impl Fetch for ScanClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}
