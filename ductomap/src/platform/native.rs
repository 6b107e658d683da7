use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};

use crate::error::LoadError;
use crate::platform::GeoJsonSource;

/// Loads documents over HTTP(S) with `reqwest`, or from the local file system for any other
/// location.
#[derive(Debug, Clone)]
pub struct NativeSource {
    http_client: reqwest::Client,
}

impl Default for NativeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeSource {
    /// Creates a new source.
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("ductomap/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { http_client }
    }

    async fn load_from_web(&self, url: &str) -> Result<Bytes, LoadError> {
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            info!("Failed to load {url}: {}", response.status());
            return Err(LoadError::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }

    async fn load_from_file(&self, path: &str) -> Result<Bytes, LoadError> {
        let path = path.strip_prefix("file://").unwrap_or(path);
        tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|err| LoadError::Io {
                url: path.to_string(),
                reason: err.to_string(),
            })
    }
}

#[async_trait]
impl GeoJsonSource for NativeSource {
    async fn load_bytes(&self, url: &str) -> Result<Bytes, LoadError> {
        debug!("Loading {url}");
        if url.starts_with("http://") || url.starts_with("https://") {
            self.load_from_web(url).await
        } else {
            self.load_from_file(url).await
        }
    }
}
