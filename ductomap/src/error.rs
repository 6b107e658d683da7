//! Error types used by the crate.
//!
//! None of these errors is fatal to a viewer. Each one stays inside the operation that caused it:
//! * [`LoadError`] affects one layer load. The layer keeps its previous content (empty on first load),
//!   other layers keep loading.
//! * [`ViewerError::FeatureGeometry`] affects one feature. The feature is not drawn, the rest of the
//!   layer is.
//! * [`ViewerError::SearchExecution`] affects one search or focus call. The query is kept so the
//!   user can retry.

use ductomap_types::error::GeometryError;
use thiserror::Error;

use crate::layer::LayerId;

/// Failure to fetch or decode the GeoJSON document of one layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Network or file system failure.
    #[error("failed to load {url}: {reason}")]
    Io {
        /// Requested resource.
        url: String,
        /// Description of the failure.
        reason: String,
    },
    /// The server answered with a non-success status.
    #[error("failed to load {url}: status {status}")]
    Http {
        /// Requested resource.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The payload is not a valid GeoJSON document.
    #[error("failed to decode GeoJSON: {0}")]
    Decode(String),
    /// Resource is not known to the source.
    #[error("resource not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<geojson::Error> for LoadError {
    fn from(value: geojson::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<reqwest::Error> for LoadError {
    fn from(value: reqwest::Error) -> Self {
        Self::Io {
            url: value
                .url()
                .map(|url| url.to_string())
                .unwrap_or_default(),
            reason: value.to_string(),
        }
    }
}

/// Viewer error type.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// A layer could not be loaded.
    #[error("failed to load layer {layer}")]
    Load {
        /// Layer that failed.
        layer: LayerId,
        /// Cause of the failure.
        #[source]
        source: LoadError,
    },
    /// A single feature has missing or malformed geometry.
    #[error("invalid feature geometry")]
    FeatureGeometry(#[from] GeometryError),
    /// Search or focusing on a search result failed.
    #[error("search failed: {0}")]
    SearchExecution(String),
    /// No layer with the given id is configured.
    #[error("unknown layer {0}")]
    UnknownLayer(LayerId),
    /// No base map with the given id is configured.
    #[error("unknown base map {0}")]
    UnknownBaseMap(String),
    /// Configuration document cannot be parsed.
    #[error("invalid configuration")]
    Config(#[from] serde_json::Error),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for LoadError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        LoadError::Io {
            url: String::new(),
            reason: format!("{value:?}"),
        }
    }
}
