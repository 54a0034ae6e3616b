use crate::error::{AppError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};

/// Body and content-type of a downloaded media response.
pub struct DownloadedMedia {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Outbound fetch capability, injected into the pipelines so tests can
/// substitute a double.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// GET the URL following redirects and return the final resolved URL.
    /// The response status is not inspected at this stage.
    async fn resolve_final_url(&self, url: &str) -> Result<String>;

    /// GET the URL and return its body. Non-success statuses fail, with no
    /// distinction between 4xx and 5xx and no retry.
    async fn download(&self, url: &str) -> Result<DownloadedMedia>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn resolve_final_url(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        Ok(response.url().to_string())
    }

    async fn download(&self, url: &str) -> Result<DownloadedMedia> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::UpstreamFetch(format!(
                "upstream responded with status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;

        Ok(DownloadedMedia {
            bytes,
            content_type,
        })
    }
}
