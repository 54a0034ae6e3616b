use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, header};

/// Per-object upload settings passed through to the storage backend.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Cache lifetime hint in seconds.
    pub cache_control: String,
    /// Overwrite an existing object under the same key.
    pub upsert: bool,
    pub content_type: String,
}

/// Object storage client, injected into the thumbnail pipeline.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<()>;
}

/// Supabase storage REST client.
///
/// Objects are written with `POST /storage/v1/object/{bucket}/{key}` using
/// the service-role key as a bearer token.
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl SupabaseStorage {
    pub fn new(client: Client, base_url: String, secret_key: String) -> Self {
        Self {
            client,
            base_url,
            secret_key,
        }
    }
}

fn object_endpoint(base_url: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/storage/v1/object/{}/{}",
        base_url.trim_end_matches('/'),
        bucket,
        key
    )
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<()> {
        let endpoint = object_endpoint(&self.base_url, bucket, key);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.secret_key)
            .header(header::CONTENT_TYPE, &options.content_type)
            .header(
                header::CACHE_CONTROL,
                format!("max-age={}", options.cache_control),
            )
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!("{}: {}", status, detail)));
        }

        Ok(())
    }
}
