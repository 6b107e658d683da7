//! Turns [thematic layers](crate::layer::ThematicLayer) into [`SurfaceItem`]s and keeps track of
//! what is on the map.
//!
//! Point features of a point layer become icon markers whose size follows the zoom level (see
//! [`icon_for_zoom`]). Line and polygon features become styled shapes. A point geometry in a line or
//! polygon layer is drawn as a circle marker in the layer style.
//!
//! Every drawn feature gets a [`Popup`] listing its properties. Features with missing or malformed
//! geometry are skipped with a warning, the rest of the layer is drawn.

use std::collections::HashMap;

use ductomap_types::geo::GeoPoint2d;
use ductomap_types::{Geom, GeometryKind};
use log::{debug, warn};

use crate::config::LayerConfig;
use crate::error::ViewerError;
use crate::layer::{FeatureRef, LayerId, Properties, Style, ThematicLayer};
use crate::surface::{IconSpec, ItemId, MapSurface, Pane, Popup, SurfaceItem};

const BASE_ICON_SIZE: f64 = 14.0;
const BASE_ICON_ZOOM: f64 = 15.0;
const MIN_ICON_SIZE: f64 = 8.0;

/// Size of point marker icons at the given zoom: `max(8, 14 - (15 - zoom))`.
pub fn icon_size(zoom: f64) -> f64 {
    (BASE_ICON_SIZE - (BASE_ICON_ZOOM - zoom)).max(MIN_ICON_SIZE)
}

/// Point marker icon for the given zoom, anchored at its centre with the popup above.
pub fn icon_for_zoom(zoom: f64) -> IconSpec {
    let size = icon_size(zoom);
    IconSpec {
        size,
        anchor: [size / 2.0, size / 2.0],
        popup_anchor: [0.0, -size / 2.0],
    }
}

/// Popup with one `name: value` line per property, in property order. `None` if there are no
/// properties.
pub fn popup_content(properties: &Properties) -> Option<Popup> {
    if properties.is_empty() {
        return None;
    }

    Some(Popup {
        lines: properties
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect(),
    })
}

/// Surface items of one feature.
#[derive(Debug, Clone)]
pub struct RenderedFeature {
    /// Index of the feature in its layer.
    pub feature: usize,
    /// Items drawn for the feature. A multipoint feature has one marker per point.
    pub items: Vec<(ItemId, SurfaceItem)>,
}

/// Surface items of a whole layer.
#[derive(Debug, Clone)]
pub struct RenderedLayer {
    layer: LayerId,
    generation: u64,
    features: Vec<RenderedFeature>,
    skipped: usize,
}

impl RenderedLayer {
    /// Layer the items belong to.
    pub fn layer(&self) -> &LayerId {
        &self.layer
    }

    /// Generation of the layer the items were built from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drawn features in load order.
    pub fn features(&self) -> &[RenderedFeature] {
        &self.features
    }

    /// Number of features that were skipped because of invalid geometry.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// All items of the layer.
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &SurfaceItem)> + '_ {
        self.features
            .iter()
            .flat_map(|feature| feature.items.iter().map(|(id, item)| (*id, item)))
    }

    /// Item that carries the popup of the feature.
    pub fn popup_item(&self, feature_index: usize) -> Option<ItemId> {
        self.features
            .iter()
            .find(|feature| feature.feature == feature_index)?
            .items
            .iter()
            .find(|(_, item)| item.popup().is_some())
            .map(|(id, _)| *id)
    }

    fn items_mut(&mut self) -> impl Iterator<Item = (ItemId, &mut SurfaceItem)> + '_ {
        self.features
            .iter_mut()
            .flat_map(|feature| feature.items.iter_mut().map(|(id, item)| (*id, item)))
    }
}

#[derive(Debug)]
struct LayerEntry {
    rendered: Option<RenderedLayer>,
    visible: bool,
}

/// Draws layers on a [`MapSurface`] and manages their visibility and point icon size.
#[derive(Debug)]
pub struct LayerRenderer {
    layers: HashMap<LayerId, LayerEntry>,
    icon: IconSpec,
}

impl LayerRenderer {
    /// Creates a renderer for the given layers, with their configured initial visibility.
    pub fn new<'a>(layers: impl IntoIterator<Item = &'a LayerConfig>, zoom: f64) -> Self {
        Self {
            layers: layers
                .into_iter()
                .map(|config| {
                    (
                        config.id.clone(),
                        LayerEntry {
                            rendered: None,
                            visible: config.visible,
                        },
                    )
                })
                .collect(),
            icon: icon_for_zoom(zoom),
        }
    }

    /// Icon currently used for point markers.
    pub fn icon(&self) -> IconSpec {
        self.icon
    }

    /// Builds the items of the layer without touching the surface.
    pub fn render(&self, layer: &ThematicLayer, style: &Style) -> RenderedLayer {
        let kind = layer.kind();
        let pane = Pane::for_kind(kind);
        let mut features = Vec::with_capacity(layer.len());
        let mut skipped = 0;

        for (index, feature) in layer.features().iter().enumerate() {
            let geometry = match feature.try_geometry() {
                Ok(geometry) => geometry,
                Err(source) => {
                    let err = ViewerError::from(source.clone());
                    warn!("Skipping feature {index} of layer {}: {err}: {source}", layer.id());
                    skipped += 1;
                    continue;
                }
            };

            let popup = popup_content(feature.properties());
            let items = self
                .feature_items(geometry, kind, style, pane, popup)
                .into_iter()
                .map(|item| (ItemId::next(), item))
                .collect();

            features.push(RenderedFeature {
                feature: index,
                items,
            });
        }

        debug!(
            "Rendered {} features of layer {}, skipped {skipped}",
            features.len(),
            layer.id()
        );

        RenderedLayer {
            layer: layer.id().clone(),
            generation: layer.generation(),
            features,
            skipped,
        }
    }

    fn feature_items(
        &self,
        geometry: &Geom,
        kind: GeometryKind,
        style: &Style,
        pane: Pane,
        popup: Option<Popup>,
    ) -> Vec<SurfaceItem> {
        let points: Vec<GeoPoint2d> = match geometry {
            Geom::Point(point) => vec![*point],
            Geom::MultiPoint(points) => points.clone(),
            shape => {
                return vec![SurfaceItem::Shape {
                    geometry: shape.clone(),
                    style: style.clone(),
                    pane,
                    popup,
                }]
            }
        };

        points
            .into_iter()
            .map(|position| match kind {
                GeometryKind::Point => SurfaceItem::Marker {
                    position,
                    icon: self.icon,
                    pane,
                    popup: popup.clone(),
                },
                GeometryKind::Polyline | GeometryKind::Polygon => SurfaceItem::CircleMarker {
                    position,
                    style: style.clone(),
                    pane,
                    popup: popup.clone(),
                },
            })
            .collect()
    }

    /// Replaces the items of the layer with the given ones. Nothing is added to the surface while
    /// the layer is hidden.
    pub fn install(&mut self, rendered: RenderedLayer, surface: &mut dyn MapSurface) {
        let Some(entry) = self.layers.get_mut(rendered.layer()) else {
            warn!("Cannot install items of unknown layer {}", rendered.layer());
            return;
        };

        if entry.visible {
            if let Some(previous) = &entry.rendered {
                for (id, _) in previous.items() {
                    surface.remove_item(id);
                }
            }

            for (id, item) in rendered.items() {
                surface.add_item(id, item);
            }
        }

        entry.rendered = Some(rendered);
    }

    /// Removes every item of the layer. Returns false if the layer is unknown.
    pub fn clear_layer(&mut self, layer: &LayerId, surface: &mut dyn MapSurface) -> bool {
        let Some(entry) = self.layers.get_mut(layer) else {
            return false;
        };

        if let Some(rendered) = entry.rendered.take() {
            if entry.visible {
                for (id, _) in rendered.items() {
                    surface.remove_item(id);
                }
            }
        }

        true
    }

    /// Shows or hides the layer. Returns true if the visibility changed.
    pub fn set_layer_visible(
        &mut self,
        layer: &LayerId,
        visible: bool,
        surface: &mut dyn MapSurface,
    ) -> Result<bool, ViewerError> {
        let entry = self
            .layers
            .get_mut(layer)
            .ok_or_else(|| ViewerError::UnknownLayer(layer.clone()))?;

        if entry.visible == visible {
            return Ok(false);
        }

        entry.visible = visible;
        if let Some(rendered) = &entry.rendered {
            for (id, item) in rendered.items() {
                if visible {
                    surface.add_item(id, item);
                } else {
                    surface.remove_item(id);
                }
            }
        }

        Ok(true)
    }

    /// Visibility of the layer. `None` if the layer is unknown.
    pub fn is_layer_visible(&self, layer: &LayerId) -> Option<bool> {
        self.layers.get(layer).map(|entry| entry.visible)
    }

    /// Items of the layer as of its last load.
    pub fn rendered(&self, layer: &LayerId) -> Option<&RenderedLayer> {
        self.layers.get(layer)?.rendered.as_ref()
    }

    /// Item whose popup should open for the feature. `None` if the feature is not on the map.
    pub fn popup_target(&self, feature: &FeatureRef) -> Option<ItemId> {
        let entry = self.layers.get(&feature.layer)?;
        if !entry.visible {
            return None;
        }

        let rendered = entry.rendered.as_ref()?;
        if rendered.generation != feature.generation {
            return None;
        }

        rendered.popup_item(feature.index)
    }

    /// Recomputes the point icon for the new zoom and applies it to every point marker. Markers of
    /// hidden layers get the new icon when they are shown again.
    pub fn on_zoom(&mut self, zoom: f64, surface: &mut dyn MapSurface) {
        let icon = icon_for_zoom(zoom);
        self.icon = icon;

        for entry in self.layers.values_mut() {
            let visible = entry.visible;
            let Some(rendered) = &mut entry.rendered else {
                continue;
            };

            for (id, item) in rendered.items_mut() {
                if let SurfaceItem::Marker { icon: current, .. } = item {
                    *current = icon;
                    if visible {
                        surface.set_marker_icon(id, &icon);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::layer::Feature;
    use crate::surface::{RecordingSurface, SurfaceCall};
    use approx::assert_relative_eq;
    use ductomap_types::error::GeometryError;
    use ductomap_types::{latlon, Contour};

    fn layer(kind: GeometryKind, features: Vec<Feature>) -> ThematicLayer {
        ThematicLayer::with_features(
            Arc::new(LayerConfig::new("test", "Test", "test.geojson", kind)),
            features,
        )
    }

    fn point(lat: f64, lon: f64) -> Feature {
        Feature::new(
            Geom::Point(latlon!(lat, lon)),
            [("PK", "A1"), ("TRAMO", "North")].into_iter().collect(),
        )
    }

    fn surface() -> RecordingSurface {
        RecordingSurface::new(latlon!(4.5, -74.2), 15.0)
    }

    #[test]
    fn icon_size_follows_zoom() {
        assert_relative_eq!(icon_size(0.0), 8.0);
        assert_relative_eq!(icon_size(6.0), 8.0);
        assert_relative_eq!(icon_size(9.0), 8.0);
        assert_relative_eq!(icon_size(10.0), 9.0);
        assert_relative_eq!(icon_size(15.0), 14.0);
        assert_relative_eq!(icon_size(18.0), 17.0);

        let sizes: Vec<_> = (0..=40).map(|z| icon_size(z as f64 / 2.0)).collect();
        assert!(sizes.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn icon_anchors() {
        let icon = icon_for_zoom(15.0);
        assert_eq!(icon.anchor, [7.0, 7.0]);
        assert_eq!(icon.popup_anchor, [0.0, -7.0]);
    }

    #[test]
    fn popup_lines_keep_property_order() {
        let feature = point(0.0, 0.0);
        let popup = popup_content(feature.properties()).expect("has properties");
        assert_eq!(popup.lines, ["PK: A1", "TRAMO: North"]);
        assert_eq!(popup.content(), "PK: A1\nTRAMO: North");
    }

    #[test]
    fn popup_formats_scalars() {
        let properties: Properties = [
            ("ABSCISA", crate::layer::PropertyValue::Number(3.0)),
            ("ACTIVO", crate::layer::PropertyValue::Bool(true)),
            ("NOTA", crate::layer::PropertyValue::Null),
        ]
        .into_iter()
        .collect();
        let popup = popup_content(&properties).expect("has properties");
        assert_eq!(popup.lines, ["ABSCISA: 3", "ACTIVO: true", "NOTA: null"]);
    }

    #[test]
    fn no_popup_without_properties() {
        assert_eq!(popup_content(&Properties::default()), None);
    }

    #[test]
    fn point_layer_draws_markers() {
        let renderer = LayerRenderer::new(&[] as &[LayerConfig], 15.0);
        let layer = layer(GeometryKind::Point, vec![point(1.0, 2.0), point(3.0, 4.0)]);
        let rendered = renderer.render(&layer, layer.style());

        assert_eq!(rendered.features().len(), 2);
        assert_eq!(rendered.skipped(), 0);
        for (_, item) in rendered.items() {
            match item {
                SurfaceItem::Marker { icon, pane, popup, .. } => {
                    assert_relative_eq!(icon.size, 14.0);
                    assert_eq!(*pane, Pane::Points);
                    assert!(popup.is_some());
                }
                other => panic!("unexpected item {other:?}"),
            }
        }
    }

    #[test]
    fn points_in_line_layer_are_circles() {
        let renderer = LayerRenderer::new(&[] as &[LayerConfig], 15.0);
        let line = Feature::new(
            Geom::Contour(Contour::new(vec![latlon!(0.0, 0.0), latlon!(1.0, 1.0)])),
            Properties::default(),
        );
        let layer = layer(GeometryKind::Polyline, vec![line, point(1.0, 2.0)]);
        let rendered = renderer.render(&layer, layer.style());
        let items: Vec<_> = rendered.items().map(|(_, item)| item.clone()).collect();

        assert!(matches!(
            items[0],
            SurfaceItem::Shape {
                pane: Pane::Polylines,
                popup: None,
                ..
            }
        ));
        assert!(matches!(
            items[1],
            SurfaceItem::CircleMarker {
                pane: Pane::Polylines,
                ..
            }
        ));
    }

    #[test]
    fn invalid_geometry_is_skipped() {
        let renderer = LayerRenderer::new(&[] as &[LayerConfig], 15.0);
        let broken = Feature::without_geometry(GeometryError::Missing, Properties::default());
        let layer = layer(GeometryKind::Point, vec![point(1.0, 2.0), broken, point(3.0, 4.0)]);
        let rendered = renderer.render(&layer, layer.style());

        assert_eq!(rendered.skipped(), 1);
        let indices: Vec<_> = rendered.features().iter().map(|f| f.feature).collect();
        assert_eq!(indices, [0, 2]);
    }

    #[test]
    fn decoded_member_with_broken_geometry_is_skipped() {
        let json = br#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-74.1, 4.6]},
                 "properties": {"PK": "AB12"}},
                {"type": "Feature", "geometry": {"type": "Circle"}, "properties": {"PK": "AB13"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-74.2, 4.7]},
                 "properties": {"PK": "AB14"}}
            ]
        }"#;
        let features = crate::decode_features(&bytes::Bytes::from_static(json))
            .expect("collection is kept");
        let renderer = LayerRenderer::new(&[] as &[LayerConfig], 15.0);
        let layer = layer(GeometryKind::Point, features);
        let rendered = renderer.render(&layer, layer.style());

        assert_eq!(layer.features().len(), 3);
        assert_eq!(rendered.skipped(), 1);
        let markers = rendered
            .items()
            .filter(|(_, item)| matches!(item, SurfaceItem::Marker { .. }))
            .count();
        assert_eq!(markers, 2);
    }

    #[test]
    fn hidden_layer_stays_off_the_surface() {
        let config = LayerConfig::new("test", "Test", "test.geojson", GeometryKind::Point)
            .with_visibility(false);
        let mut renderer = LayerRenderer::new([&config], 15.0);
        let mut surface = surface();
        let layer = layer(GeometryKind::Point, vec![point(1.0, 2.0)]);

        let rendered = renderer.render(&layer, layer.style());
        renderer.install(rendered, &mut surface);
        assert!(surface.items().is_empty());

        let changed = renderer
            .set_layer_visible(layer.id(), true, &mut surface)
            .expect("known layer");
        assert!(changed);
        assert_eq!(surface.items().len(), 1);

        renderer
            .set_layer_visible(layer.id(), false, &mut surface)
            .expect("known layer");
        assert!(surface.items().is_empty());
    }

    #[test]
    fn popup_target_checks_layer_generation() {
        let config = LayerConfig::new("test", "Test", "test.geojson", GeometryKind::Point);
        let mut renderer = LayerRenderer::new([&config], 15.0);
        let mut surface = surface();
        let layer = layer(GeometryKind::Point, vec![point(1.0, 2.0)]);
        let rendered = renderer.render(&layer, layer.style());
        renderer.install(rendered, &mut surface);

        let current = FeatureRef {
            layer: layer.id().clone(),
            index: 0,
            generation: layer.generation(),
        };
        assert!(renderer.popup_target(&current).is_some());

        let stale = FeatureRef {
            generation: layer.generation() + 1,
            ..current
        };
        assert_eq!(renderer.popup_target(&stale), None);
    }

    #[test]
    fn reinstall_replaces_items() {
        let config = LayerConfig::new("test", "Test", "test.geojson", GeometryKind::Point);
        let mut renderer = LayerRenderer::new([&config], 15.0);
        let mut surface = surface();

        let first = layer(GeometryKind::Point, vec![point(1.0, 2.0), point(3.0, 4.0)]);
        let rendered = renderer.render(&first, first.style());
        renderer.install(rendered, &mut surface);
        assert_eq!(surface.items().len(), 2);

        let second = layer(GeometryKind::Point, vec![point(5.0, 6.0)]);
        let rendered = renderer.render(&second, second.style());
        renderer.install(rendered, &mut surface);
        assert_eq!(surface.items().len(), 1);

        assert!(renderer.clear_layer(second.id(), &mut surface));
        assert!(surface.items().is_empty());
    }

    #[test]
    fn unknown_layer_visibility() {
        let mut renderer = LayerRenderer::new(&[] as &[LayerConfig], 15.0);
        let result = renderer.set_layer_visible(&"missing".into(), true, &mut surface());
        assert!(matches!(result, Err(ViewerError::UnknownLayer(_))));
    }

    #[test]
    fn zoom_updates_visible_markers() {
        let visible = LayerConfig::new("visible", "Visible", "a.geojson", GeometryKind::Point);
        let hidden = LayerConfig::new("hidden", "Hidden", "b.geojson", GeometryKind::Point)
            .with_visibility(false);
        let mut renderer = LayerRenderer::new([&visible, &hidden], 15.0);
        let mut surface = surface();

        for config in [&visible, &hidden] {
            let layer = ThematicLayer::with_features(
                Arc::new(config.clone()),
                vec![point(1.0, 2.0)],
            );
            let rendered = renderer.render(&layer, layer.style());
            renderer.install(rendered, &mut surface);
        }
        surface.take_calls();

        renderer.on_zoom(10.0, &mut surface);
        let calls = surface.take_calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], SurfaceCall::SetMarkerIcon(_, icon) if icon.size == 9.0));

        renderer
            .set_layer_visible(&hidden.id, true, &mut surface)
            .expect("known layer");
        let resized = surface.count(|item| {
            matches!(item, SurfaceItem::Marker { icon, .. } if icon.size == 9.0)
        });
        assert_eq!(resized, 2);
    }
}
