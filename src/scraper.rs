use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::config::DelayBounds;

/// Source of raw page bytes for a url.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Decides and takes the pause between two fetches.
#[allow(async_fn_in_trait)]
pub trait Pacer {
    fn next_delay(&mut self) -> Duration;
    async fn wait(&mut self, delay: Duration);
}

/// Plain GET with a browser user agent. Status codes are not checked:
/// an error page body is handed on like any other.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).context("Invalid user agent")?,
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        debug!("GET {} -> {}", url, response.status());
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;
        Ok(body.to_vec())
    }
}

/// Uniform whole-second delay within the configured bounds, slept on the tokio timer.
pub struct RandomPacer {
    bounds: DelayBounds,
}

impl RandomPacer {
    pub fn new(bounds: DelayBounds) -> Self {
        RandomPacer { bounds }
    }
}

impl Pacer for RandomPacer {
    fn next_delay(&mut self) -> Duration {
        let secs = fastrand::u64(self.bounds.min.as_secs()..=self.bounds.max.as_secs());
        Duration::from_secs(secs)
    }

    async fn wait(&mut self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_delay_stays_in_bounds() {
        let mut pacer = RandomPacer::new(DelayBounds::default());
        for _ in 0..500 {
            let d = pacer.next_delay().as_secs();
            assert!((3..=14).contains(&d), "delay {d} out of range");
        }
    }

    #[test]
    fn fixed_bounds_give_fixed_delay() {
        let mut pacer = RandomPacer::new(DelayBounds::from_secs(5, 5).unwrap());
        assert_eq!(pacer.next_delay(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_sleeps_on_tokio_clock() {
        let mut pacer = RandomPacer::new(DelayBounds::default());
        let start = tokio::time::Instant::now();
        pacer.wait(Duration::from_secs(7)).await;
        assert!(start.elapsed() >= Duration::from_secs(7));
    }

    #[test]
    fn client_builds_with_fixed_user_agent() {
        assert!(HttpFetcher::new(crate::config::USER_AGENT).is_ok());
    }
}
