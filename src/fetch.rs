//! Remote Fetcher
//!
//! This module specifies how the server gets hold of source images.
//!
//! It's supposed to be dumb and simple: a URL goes in, bytes come out,
//! or the URL was not accessible. Whether the bytes are an image is none
//! of its business.

use async_trait::async_trait;

/// The only way a fetch can fail, as far as callers care.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Unparsable URL, unreachable host, timeout, non-2xx status, or a
    /// body that broke off halfway.
    #[error("{url} is not accessible")]
    Inaccessible {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

impl FetchError {
    pub fn inaccessible(url: &str, source: impl Into<anyhow::Error>) -> Self {
        FetchError::Inaccessible {
            url: url.to_string(),
            source: source.into(),
        }
    }
}

/// Retrieve raw bytes from a URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
