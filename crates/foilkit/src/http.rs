use crate::prelude::*;
use std::time::Duration;

const USER_AGENT: &str = concat!("foilkit/", env!("CARGO_PKG_VERSION"));

/// HTTP settings shared by the downloaders
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Pause between consecutive requests
    pub delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(delay_secs: f64, timeout_secs: u64) -> Result<Self> {
        let delay = Duration::try_from_secs_f64(delay_secs)
            .map_err(|e| eyre!("Invalid delay '{}': {}", delay_secs, e))?;

        Ok(Self {
            delay,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Create the HTTP client used for scraping
pub fn create_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// Cooperative rate limit between requests to the same server
pub async fn polite_delay(config: &HttpConfig) {
    if !config.delay.is_zero() {
        tokio::time::sleep(config.delay).await;
    }
}

async fn get(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, Error> {
    log::debug!("GET {url}");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Network(format!("Failed to fetch {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::Network(format!(
            "Failed to fetch {url}: HTTP {}",
            response.status()
        )));
    }

    Ok(response)
}

/// Fetch a page as text
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, Error> {
    get(client, url)
        .await?
        .text()
        .await
        .map_err(|e| Error::Network(format!("Failed to read body of {url}: {e}")))
}

/// Fetch a resource as raw bytes
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, Error> {
    get(client, url)
        .await?
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| Error::Network(format!("Failed to read body of {url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_new() {
        let config = HttpConfig::new(2.0, 30).unwrap();
        assert_eq!(config.delay, Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_http_config_rejects_negative_delay() {
        assert!(HttpConfig::new(-1.0, 30).is_err());
    }

    #[tokio::test]
    async fn test_polite_delay_waits_configured_time() {
        let config = HttpConfig::new(0.05, 30).unwrap();
        let start = std::time::Instant::now();
        polite_delay(&config).await;
        assert!(start.elapsed() >= config.delay);
    }
}
