//! Platform specific loading of GeoJSON documents, behind the [`GeoJsonSource`] trait.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use maybe_sync::{MaybeSend, MaybeSync};

use crate::error::LoadError;

/// Source of raw GeoJSON documents.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait GeoJsonSource: MaybeSend + MaybeSync {
    /// Loads the document at `url`.
    async fn load_bytes(&self, url: &str) -> Result<Bytes, LoadError>;
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

/// Default implementation of the [`GeoJsonSource`] for the current platform.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformSource = native::NativeSource;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Default implementation of the [`GeoJsonSource`] for the current platform.
#[cfg(target_arch = "wasm32")]
pub type PlatformSource = web::WebSource;

/// Source serving documents from memory, e.g. layers bundled into the binary with `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, Result<Bytes, LoadError>>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `data` for `url`.
    pub fn with_document(mut self, url: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.documents.insert(url.into(), Ok(data.into()));
        self
    }

    /// Answers every request for `url` with `error`.
    pub fn with_failure(mut self, url: impl Into<String>, error: LoadError) -> Self {
        self.documents.insert(url.into(), Err(error));
        self
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl GeoJsonSource for MemorySource {
    async fn load_bytes(&self, url: &str) -> Result<Bytes, LoadError> {
        self.documents
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(LoadError::NotFound(url.to_string())))
    }
}
