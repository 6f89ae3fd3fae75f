use crate::error::ImportError;
use log::debug;
use reqwest::Client;
use std::time::Duration;

/// Plain HTTP page fetcher. One attempt per call; failures are surfaced as-is.
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Result<Self, ImportError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ImportError::BuilderError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<String, ImportError> {
        debug!("RequestFetcher: GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(url, format!("HTTP {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| fetch_error(url, e.to_string()))?;
        debug!("RequestFetcher: received {} bytes from {}", html.len(), url);
        Ok(html)
    }
}

fn fetch_error(url: &str, reason: String) -> ImportError {
    ImportError::FetchError {
        url: url.to_string(),
        reason,
    }
}
