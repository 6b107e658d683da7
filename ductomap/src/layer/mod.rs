//! [Thematic layers](ThematicLayer) hold the features of one GeoJSON dataset together with the way they
//! should be drawn.
//!
//! A layer is described by a [`LayerConfig`](crate::config::LayerConfig): where its GeoJSON document
//! lives, what [`GeometryKind`] it holds, its [`Style`] and which property supplies its label text.
//! The features themselves live in the [`GeometryStore`], one [`ThematicLayer`] per configured layer.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::LayerConfig;

pub mod attribution;
mod feature;
mod feature_store;
pub(crate) mod loader;
mod style;

pub use ductomap_types::GeometryKind;
pub use feature::{Feature, FeatureRef, Properties, PropertyValue};
pub use feature_store::GeometryStore;
pub use style::Style;

/// Identifier of a thematic layer, as given in its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Creates a new id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// String form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One logical dataset (points, lines or polygons) drawn with one style.
///
/// The feature list is replaced as a whole every time the layer is (re)loaded. Each replacement
/// bumps the layer [generation](Self::generation), so references taken before it no longer resolve.
#[derive(Debug, Clone)]
pub struct ThematicLayer {
    config: Arc<LayerConfig>,
    features: Vec<Feature>,
    generation: u64,
}

impl ThematicLayer {
    /// Creates an empty layer.
    pub fn new(config: Arc<LayerConfig>) -> Self {
        Self {
            config,
            features: Vec::new(),
            generation: 0,
        }
    }

    /// Creates a layer with the given features.
    pub fn with_features(config: Arc<LayerConfig>, features: Vec<Feature>) -> Self {
        Self {
            config,
            features,
            generation: 0,
        }
    }

    /// Layer id.
    pub fn id(&self) -> &LayerId {
        &self.config.id
    }

    /// Human readable name of the layer.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Kind of geometries the layer holds.
    pub fn kind(&self) -> GeometryKind {
        self.config.kind
    }

    /// Style used to draw the layer.
    pub fn style(&self) -> &Style {
        &self.config.style
    }

    /// Name of the property that supplies label text.
    pub fn label_field(&self) -> Option<&str> {
        self.config.label_field.as_deref()
    }

    /// Configuration the layer was created from.
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Features in load order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Feature at `index` in load order.
    pub fn feature(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    /// Counter of feature list replacements.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the layer holds no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub(crate) fn replace_features(&mut self, features: Vec<Feature>) {
        self.features = features;
        self.generation += 1;
    }

    pub(crate) fn clear(&mut self) {
        self.features.clear();
        self.generation += 1;
    }
}
