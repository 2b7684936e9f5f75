//! Remote Fetcher over HTTP(S).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::fetch::{Fetch, FetchError};
use crate::primitive::{anyhow::Context, tracing::instrument};

/// Fetch with a shared [`reqwest::Client`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    /// Build a client whose every request gives up after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("HttpFetch: build client")?;
        Ok(Self { client })
    }
}

/// Only absolute http(s) URLs are worth a network round trip.
fn parse_source_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("bad url {raw:?}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow::anyhow!("unsupported scheme {other:?}")),
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed =
            parse_source_url(url).map_err(|e| FetchError::inaccessible(url, e))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::inaccessible(url, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::inaccessible(url, e))?;
        tracing::trace!("Fetched {} bytes", body.len());
        Ok(body.to_vec())
    }
}
