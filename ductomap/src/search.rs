//! Case-insensitive substring search over feature property values, and zoom-to-feature.

use ductomap_types::geo::GeoPoint2d;
use log::debug;

use crate::error::ViewerError;
use crate::layer::{FeatureRef, GeometryStore, LayerId};
use crate::render::LayerRenderer;
use crate::surface::{FitOptions, MapSurface};

/// Zoom used when focusing on a feature: the fixed zoom of a point, the zoom cap of anything else.
pub const FOCUS_ZOOM: f64 = 17.0;
/// Space left around a feature's bounds when focusing on it, in pixels.
pub const FOCUS_PADDING: f64 = 50.0;

/// One property value that matched a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Search label of the layer, e.g. `Postes`.
    pub layer_label: String,
    /// Name of the matching property.
    pub property: String,
    /// Value of the matching property as displayed.
    pub value: String,
    /// The feature owning the property.
    pub feature: FeatureRef,
}

/// Result of [`FeatureSearchIndex::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query was empty after trimming. Nothing was searched.
    NoQuery,
    /// Matches in search order. Empty if nothing matched.
    Results(Vec<SearchResult>),
}

impl SearchOutcome {
    /// Matches, empty for [`SearchOutcome::NoQuery`].
    pub fn results(&self) -> &[SearchResult] {
        match self {
            Self::NoQuery => &[],
            Self::Results(results) => results,
        }
    }
}

/// Searches the loaded layers in a fixed order.
#[derive(Debug, Clone)]
pub struct FeatureSearchIndex {
    order: Vec<LayerId>,
}

impl FeatureSearchIndex {
    /// Creates an index that searches the layers in the given order.
    pub fn new(order: Vec<LayerId>) -> Self {
        Self { order }
    }

    /// Layer search order.
    pub fn order(&self) -> &[LayerId] {
        &self.order
    }

    /// Normalized form of a query: trimmed and lowercase.
    pub fn normalize(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Finds every property whose value contains the query, ignoring case.
    ///
    /// Results follow the layer search order, then feature load order, then property order. A
    /// feature has one result per matching property.
    pub fn search(&self, store: &GeometryStore, query: &str) -> SearchOutcome {
        let query = Self::normalize(query);
        if query.is_empty() {
            return SearchOutcome::NoQuery;
        }

        let mut results = vec![];
        for layer in self.order.iter().filter_map(|id| store.layer(id)) {
            let layer_label = layer.config().search_label();
            for (index, feature) in layer.features().iter().enumerate() {
                for (name, value) in feature.properties().iter() {
                    let value = value.to_string();
                    if value.to_lowercase().contains(&query) {
                        results.push(SearchResult {
                            layer_label: layer_label.to_string(),
                            property: name.to_string(),
                            value,
                            feature: FeatureRef {
                                layer: layer.id().clone(),
                                index,
                                generation: layer.generation(),
                            },
                        });
                    }
                }
            }
        }

        debug!("Search for {query:?} found {} results", results.len());
        SearchOutcome::Results(results)
    }

    /// Moves the view to the feature of the result and opens its popup.
    ///
    /// A feature with extent is fitted into the view, zoomed in no further than [`FOCUS_ZOOM`].
    /// A point is centred at [`FOCUS_ZOOM`].
    pub fn focus(
        &self,
        result: &SearchResult,
        store: &GeometryStore,
        renderer: &LayerRenderer,
        surface: &mut dyn MapSurface,
    ) -> Result<(), ViewerError> {
        let feature = store.feature(&result.feature).ok_or_else(|| {
            ViewerError::SearchExecution(format!(
                "feature {} of layer {} no longer exists",
                result.feature.index, result.feature.layer
            ))
        })?;

        let geometry = feature.try_geometry().map_err(|err| {
            ViewerError::SearchExecution(format!(
                "feature {} of layer {} cannot be shown: {err}",
                result.feature.index, result.feature.layer
            ))
        })?;

        let no_points = || {
            ViewerError::SearchExecution(format!(
                "feature {} of layer {} has no coordinates",
                result.feature.index, result.feature.layer
            ))
        };

        if geometry.has_extent() {
            let bounds = geometry.bounding_rect().ok_or_else(no_points)?;
            surface.fit_bounds(
                &bounds,
                FitOptions {
                    padding: FOCUS_PADDING,
                    max_zoom: FOCUS_ZOOM,
                },
            );
        } else {
            let center: GeoPoint2d = geometry.anchor().ok_or_else(no_points)?;
            surface.set_view(center, FOCUS_ZOOM);
        }

        if let Some(item) = renderer.popup_target(&result.feature) {
            surface.open_popup(item);
        }

        Ok(())
    }
}
