//! Declarative description of a viewer: initial view, base maps, thematic layers and the state of
//! the interactive tools.
//!
//! A config is usually read from a JSON document with [`ViewerConfig::from_json`]:
//!
//! ```json
//! {
//!   "view": { "center": { "lat": 4.5709, "lon": -74.2973 }, "zoom": 6 },
//!   "layers": [
//!     { "id": "postes", "name": "Postes", "url": "geojs/postes.geojson", "kind": "point",
//!       "style": { "color": "#FF0000" }, "label_field": "PK" }
//!   ]
//! }
//! ```

use std::sync::Arc;

use ductomap_types::geo::GeoPoint2d;
use ductomap_types::latlon;
use serde::{Deserialize, Serialize};

use crate::coordinates::CoordinateFormat;
use crate::error::ViewerError;
use crate::layer::attribution::Attribution;
use crate::layer::{GeometryKind, LayerId, Style};
use crate::Color;

/// Complete configuration of a viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Initial view of the map.
    #[serde(default)]
    pub view: ViewConfig,
    /// Base maps the user can switch between.
    #[serde(default)]
    pub base_maps: Vec<BaseMapConfig>,
    /// Base map shown on start. Defaults to the first configured one.
    #[serde(default)]
    pub default_base_map: Option<String>,
    /// Thematic layers in declared order.
    pub layers: Vec<LayerConfig>,
    /// Order in which layers are searched. Empty means declared order.
    #[serde(default)]
    pub search_order: Vec<LayerId>,
    /// Initial visibility of the label groups.
    #[serde(default)]
    pub labels: LabelConfig,
    /// Initial format of the coordinate readout.
    #[serde(default)]
    pub coordinate_format: CoordinateFormat,
}

/// Initial map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Map centre.
    pub center: GeoPoint2d,
    /// Zoom level.
    pub zoom: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: latlon!(0.0, 0.0),
            zoom: 2.0,
        }
    }
}

/// A raster tile service that can be used as the map background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseMapConfig {
    /// Id used to switch to the base map.
    pub id: String,
    /// Name shown to the user.
    pub name: String,
    /// Tile url with `{z}`, `{x}`, `{y}` and optionally `{s}` placeholders.
    pub url_template: String,
    /// Credit shown while the base map is active.
    pub attribution: Attribution,
}

/// Initial visibility of the three label groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Labels of point layers.
    pub point: bool,
    /// Labels of polyline layers.
    pub polyline: bool,
    /// Labels of polygon layers.
    pub polygon: bool,
}

/// Description of one thematic layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Layer id.
    pub id: LayerId,
    /// Name shown to the user.
    pub name: String,
    /// Location of the GeoJSON document.
    pub url: String,
    /// Kind of geometries in the document.
    pub kind: GeometryKind,
    /// Drawing style.
    #[serde(default)]
    pub style: Style,
    /// Property whose value is shown as the feature label.
    #[serde(default)]
    pub label_field: Option<String>,
    /// Whether the layer is shown on start.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Name shown next to search results from this layer. Defaults to `name`.
    #[serde(default)]
    pub search_label: Option<String>,
}

fn default_visible() -> bool {
    true
}

impl LayerConfig {
    /// Creates a visible layer config with the default style and no labels.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        kind: GeometryKind,
    ) -> Self {
        Self {
            id: LayerId::new(id),
            name: name.into(),
            url: url.into(),
            kind,
            style: Style::default(),
            label_field: None,
            visible: true,
            search_label: None,
        }
    }

    /// Sets the drawing style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the property used as label text.
    pub fn with_label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = Some(field.into());
        self
    }

    /// Sets the name shown next to search results.
    pub fn with_search_label(mut self, label: impl Into<String>) -> Self {
        self.search_label = Some(label.into());
        self
    }

    /// Sets the initial visibility.
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Name shown next to search results.
    pub fn search_label(&self) -> &str {
        self.search_label.as_deref().unwrap_or(&self.name)
    }
}

impl ViewerConfig {
    /// Creates a config with the given layers and default everything else.
    pub fn new(layers: Vec<LayerConfig>) -> Self {
        Self {
            view: ViewConfig::default(),
            base_maps: Vec::new(),
            default_base_map: None,
            layers,
            search_order: Vec::new(),
            labels: LabelConfig::default(),
            coordinate_format: CoordinateFormat::default(),
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every id the config refers to is defined.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if let Some(id) = self
            .search_order
            .iter()
            .find(|id| !self.layers.iter().any(|layer| &layer.id == *id))
        {
            return Err(ViewerError::UnknownLayer(id.clone()));
        }

        if let Some(id) = &self.default_base_map {
            if !self.base_maps.iter().any(|base_map| &base_map.id == id) {
                return Err(ViewerError::UnknownBaseMap(id.clone()));
            }
        }

        Ok(())
    }

    /// Layer ids in search order.
    pub fn effective_search_order(&self) -> Vec<LayerId> {
        if self.search_order.is_empty() {
            self.layers.iter().map(|layer| layer.id.clone()).collect()
        } else {
            self.search_order.clone()
        }
    }

    /// Shared copies of the layer configs, in declared order.
    pub(crate) fn shared_layers(&self) -> Vec<Arc<LayerConfig>> {
        self.layers.iter().cloned().map(Arc::new).collect()
    }

    /// The pipeline corridor viewer: a point layer of posts, four pipeline sections and the rural
    /// districts (veredas) they cross, over OpenStreetMap or ESRI satellite imagery.
    pub fn corridor() -> Self {
        let duct = |id: &str, name: &str, url: &str, color: &'static str, label: &str| {
            LayerConfig::new(id, name, url, GeometryKind::Polyline)
                .with_style(Style::stroke(Color::from_hex(color), 4.0, 0.8))
                .with_label_field(label)
                .with_search_label(name.replace("Ducto", "Línea"))
        };

        Self {
            view: ViewConfig {
                center: latlon!(4.5709, -74.2973),
                zoom: 6.0,
            },
            base_maps: vec![
                BaseMapConfig {
                    id: "osm".into(),
                    name: "OpenStreetMap".into(),
                    url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
                    attribution: Attribution::new(
                        "© OpenStreetMap contributors",
                        Some("https://www.openstreetmap.org/copyright".into()),
                    ),
                },
                BaseMapConfig {
                    id: "esri_satellite".into(),
                    name: "ESRI Satellite".into(),
                    url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".into(),
                    attribution: Attribution::new(
                        "Tiles © Esri. Source: Esri, Maxar, Earthstar Geographics",
                        None,
                    ),
                },
            ],
            default_base_map: Some("osm".into()),
            layers: vec![
                LayerConfig::new(
                    "postes",
                    "Postes",
                    "geojs/Edificacion_Cor_D2.geojson",
                    GeometryKind::Point,
                )
                .with_style(Style::stroke(Color::RED, 3.0, 1.0))
                .with_label_field("PK"),
                duct("ducto_c1", "Ducto C1", "geojs/Ducto_C1.geojson", "#DE1414", "TRAMO"),
                duct("ducto_c2", "Ducto C2", "geojs/Ducto_C2.geojson", "#5CEE0E", "TRM_RML"),
                duct("ducto_c3", "Ducto C3", "geojs/Ducto C3.geojson", "#EE0ECC", "TRM_RML"),
                duct(
                    "ducto_c4",
                    "Ducto C4",
                    "geojs/Ducto_Turno4_Adicional.geojson",
                    "#0E30EE",
                    "TRM_RML",
                ),
                LayerConfig::new(
                    "veredas",
                    "Veredas",
                    "geojs/VeredasT5.geojson",
                    GeometryKind::Polygon,
                )
                .with_style(
                    Style::stroke(Color::from_hex("#EDBD0E"), 1.0, 1.0)
                        .with_fill(Color::from_hex("#EDED0E"), 0.3),
                )
                .with_label_field("VEREDA"),
            ],
            search_order: ["veredas", "ducto_c1", "ducto_c2", "ducto_c3", "ducto_c4", "postes"]
                .into_iter()
                .map(LayerId::from)
                .collect(),
            labels: LabelConfig::default(),
            coordinate_format: CoordinateFormat::Dms,
        }
    }
}
