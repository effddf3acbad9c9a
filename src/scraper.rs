use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result};

/// Retrieves raw page bodies with browser-like headers and a bounded timeout.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("user_agent", &config.user_agent)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("accept_language", &config.accept_language)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self { client })
    }

    /// Fetches `url` and returns the body. Timeouts, connection failures and
    /// non-success statuses are all `AppError::Network`.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!(url, "fetching page");

        let response = self.client.get(url).send().await?.error_for_status()?;
        let status = response.status();
        let body = response.text().await?;

        info!(
            url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "page fetched"
        );
        Ok(body)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| AppError::Parse {
        message: format!("invalid {} header value: {}", name, e),
    })
}
