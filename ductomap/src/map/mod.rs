//! [`MapViewModel`] owns the state of a viewer and applies user actions and loaded data to it.

use std::sync::Arc;

use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{error, info, warn};

use crate::config::{LayerConfig, ViewerConfig};
use crate::control::{EventPropagation, MapEvent, MapEventHandler};
use crate::coordinates::{CoordinateDisplay, CoordinateFormat};
use crate::error::ViewerError;
use crate::label::{LabelAnnotator, LabelGroup};
use crate::layer::attribution::Attribution;
use crate::layer::loader::{load_features, LoadCompletion};
use crate::layer::{GeometryStore, LayerId};
use crate::measure::MeasurementSession;
use crate::platform::GeoJsonSource;
use crate::render::LayerRenderer;
use crate::search::{FeatureSearchIndex, SearchOutcome, SearchResult};
use crate::subscriber::{Subscriber, ViewerEvent};
use crate::surface::MapSurface;

mod base_maps;
mod builder;

pub use base_maps::BaseMapCollection;
pub use builder::MapViewModelBuilder;

/// State of a viewer: layers and their features, labels, the measurement tool, search, the
/// coordinate readout and the base map, all drawn on one [`MapSurface`].
///
/// Created with [`MapViewModelBuilder`]. Layer documents are fetched with
/// [`load_layers`](MapViewModel::load_layers), or in the background with
/// [`spawn_loads`](MapViewModel::spawn_loads) and [`apply_load`](MapViewModel::apply_load).
pub struct MapViewModel {
    config: ViewerConfig,
    layer_configs: Vec<Arc<LayerConfig>>,
    store: GeometryStore,
    renderer: LayerRenderer,
    labels: LabelAnnotator,
    measurement: MeasurementSession,
    search: FeatureSearchIndex,
    last_query: Option<String>,
    coordinates: CoordinateDisplay,
    base_maps: BaseMapCollection,
    surface: Box<dyn MapSurface>,
    source: Arc<dyn GeoJsonSource>,
    handlers: Vec<Box<dyn MapEventHandler>>,
    subscribers: Vec<Box<dyn Subscriber>>,
}

impl MapViewModel {
    /// Configuration the viewer was built from.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Loaded features of all layers.
    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    /// Renderer holding the drawn items of all layers.
    pub fn renderer(&self) -> &LayerRenderer {
        &self.renderer
    }

    /// Labels of all layers.
    pub fn labels(&self) -> &LabelAnnotator {
        &self.labels
    }

    /// The measurement tool.
    pub fn measurement(&self) -> &MeasurementSession {
        &self.measurement
    }

    /// The coordinate readout.
    pub fn coordinates(&self) -> &CoordinateDisplay {
        &self.coordinates
    }

    /// Configured base maps.
    pub fn base_maps(&self) -> &BaseMapCollection {
        &self.base_maps
    }

    /// Attribution of the active base map.
    pub fn attribution(&self) -> Option<&Attribution> {
        self.base_maps.attribution()
    }

    /// The last search query, kept so a failed focus can be retried.
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// The surface the viewer draws on.
    pub fn surface(&self) -> &dyn MapSurface {
        &*self.surface
    }

    /// Registers a receiver of viewer events.
    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    fn notify(&self, event: ViewerEvent) {
        for subscriber in &self.subscribers {
            subscriber.notify(&event);
        }
    }

    /// Fetches every layer concurrently and applies each result as soon as it arrives.
    ///
    /// A failing layer does not affect the others. There is no ordering between layers.
    pub async fn load_layers(&mut self) {
        let mut loads: FuturesUnordered<_> = self
            .layer_configs
            .iter()
            .map(|config| load_layer(self.source.clone(), config.clone()))
            .collect();

        while let Some(completion) = loads.next().await {
            self.apply_load(completion);
        }
    }

    /// Fetches one layer and applies the result.
    pub async fn reload_layer(&mut self, layer: &LayerId) -> Result<(), ViewerError> {
        let config = self.layer_config(layer)?.clone();
        let completion = load_layer(self.source.clone(), config).await;
        self.apply_load(completion);
        Ok(())
    }

    /// Starts fetching every layer in the background. The returned channel yields one
    /// [`LoadCompletion`] per layer, to be passed to [`MapViewModel::apply_load`].
    pub fn spawn_loads(&self) -> UnboundedReceiver<LoadCompletion> {
        let (sender, receiver) = mpsc::unbounded();
        for config in &self.layer_configs {
            let sender = sender.clone();
            let source = self.source.clone();
            let config = config.clone();
            crate::async_runtime::spawn(async move {
                let completion = load_layer(source, config).await;
                if sender.unbounded_send(completion).is_err() {
                    warn!("Layer load finished after the receiver was dropped");
                }
            });
        }

        receiver
    }

    /// Applies every completion that has already arrived on the channel. Returns the number of
    /// applied completions.
    pub fn apply_ready(&mut self, receiver: &mut UnboundedReceiver<LoadCompletion>) -> usize {
        let mut applied = 0;
        while let Ok(Some(completion)) = receiver.try_next() {
            self.apply_load(completion);
            applied += 1;
        }

        applied
    }

    /// Replaces the features, drawn items and labels of the completed layer. A failed load is
    /// logged and reported, and the layer keeps what it had.
    pub fn apply_load(&mut self, completion: LoadCompletion) {
        let LoadCompletion { layer, result } = completion;
        let features = match result {
            Ok(features) => features,
            Err(source) => {
                let err = ViewerError::Load {
                    layer: layer.clone(),
                    source: source.clone(),
                };
                error!("{err}: {source}");
                self.notify(ViewerEvent::LayerLoadFailed {
                    layer,
                    error: source,
                });
                return;
            }
        };

        if !self.store.replace(&layer, features) {
            warn!("Ignoring features of unknown layer {layer}");
            return;
        }

        let surface = &mut *self.surface;
        self.labels.clear_layer(&layer, surface);

        let Some(thematic) = self.store.layer(&layer) else {
            return;
        };

        let rendered = self.renderer.render(thematic, thematic.style());
        let skipped = rendered.skipped();
        self.renderer.install(rendered, surface);

        for feature in thematic.features() {
            if let Some(entry) = LabelAnnotator::maybe_create_label(feature, thematic) {
                self.labels.add(entry, surface);
            }
        }

        let feature_count = thematic.len();
        info!("Layer {layer} loaded with {feature_count} features");
        self.notify(ViewerEvent::LayerLoaded {
            layer,
            feature_count,
            skipped,
        });
    }

    /// Drops all features, items and labels of the layer. Calling it again has no further effect.
    pub fn clear_layer(&mut self, layer: &LayerId) -> Result<(), ViewerError> {
        if !self.store.clear(layer) {
            return Err(ViewerError::UnknownLayer(layer.clone()));
        }

        self.renderer.clear_layer(layer, &mut *self.surface);
        self.labels.clear_layer(layer, &mut *self.surface);
        Ok(())
    }

    /// Shows or hides a layer.
    pub fn set_layer_visible(&mut self, layer: &LayerId, visible: bool) -> Result<(), ViewerError> {
        if self
            .renderer
            .set_layer_visible(layer, visible, &mut *self.surface)?
        {
            self.notify(ViewerEvent::LayerVisibilityChanged {
                layer: layer.clone(),
                visible,
            });
        }

        Ok(())
    }

    /// Shows or hides a label group.
    pub fn set_label_group_visible(&mut self, group: LabelGroup, visible: bool) {
        if self
            .labels
            .set_group_visible(group, visible, &mut *self.surface)
        {
            self.notify(ViewerEvent::LabelGroupVisibilityChanged { group, visible });
        }
    }

    /// Starts a new measurement, discarding the previous one.
    pub fn start_measurement(&mut self) {
        self.measurement.start(&mut *self.surface);
        self.notify(ViewerEvent::MeasurementUpdated(self.measurement.snapshot()));
    }

    /// Stops the measurement and removes what it drew.
    pub fn stop_measurement(&mut self) {
        self.measurement.stop(&mut *self.surface);
        self.notify(ViewerEvent::MeasurementUpdated(self.measurement.snapshot()));
    }

    /// Starts or stops the measurement. Returns true if it is active afterwards.
    pub fn toggle_measurement(&mut self) -> bool {
        let active = self.measurement.toggle(&mut *self.surface);
        self.notify(ViewerEvent::MeasurementUpdated(self.measurement.snapshot()));
        active
    }

    /// Searches the property values of all loaded features.
    pub fn search(&mut self, query: &str) -> SearchOutcome {
        self.last_query = Some(query.to_string());
        let outcome = self.search.search(&self.store, query);
        self.notify(ViewerEvent::SearchCompleted {
            query: FeatureSearchIndex::normalize(query),
            result_count: outcome.results().len(),
        });

        outcome
    }

    /// Moves the view to the feature of a search result and opens its popup.
    ///
    /// A failure is logged and reported to subscribers. The last query stays available through
    /// [`MapViewModel::last_query`].
    pub fn focus(&mut self, result: &SearchResult) -> Result<(), ViewerError> {
        let focused = self
            .search
            .focus(result, &self.store, &self.renderer, &mut *self.surface);

        if let Err(err) = &focused {
            warn!("{err}");
            self.notify(ViewerEvent::SearchFailed {
                query: self.last_query.clone().unwrap_or_default(),
                reason: err.to_string(),
            });
        }

        focused
    }

    /// Changes the coordinate format and shows the map centre in it.
    pub fn set_coordinate_format(&mut self, format: CoordinateFormat) {
        let center = self.surface.center();
        let readout = self.coordinates.set_format(format, center).clone();
        self.notify(ViewerEvent::CoordinatesChanged(readout));
    }

    /// Switches to another configured base map.
    pub fn set_base_map(&mut self, id: &str) -> Result<(), ViewerError> {
        if self.base_maps.activate(id, &mut *self.surface)? {
            self.notify(ViewerEvent::BaseMapChanged { id: id.to_string() });
        }

        Ok(())
    }

    /// Adds a handler that gets the events the built-in tools let through.
    pub fn add_event_handler(&mut self, handler: impl MapEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Applies a map event: clicks to the measurement, zoom changes to the point icons, pointer
    /// movement to the coordinate readout, then the added handlers.
    pub fn handle_event(&mut self, event: MapEvent) -> EventPropagation {
        let surface = &mut *self.surface;

        let measurement_before = self.measurement.snapshot();
        let propagation = self.measurement.handle(&event, surface);
        let measurement_after = self.measurement.snapshot();
        if measurement_before != measurement_after {
            self.notify(ViewerEvent::MeasurementUpdated(measurement_after));
        }
        if propagation == EventPropagation::Stop {
            return propagation;
        }

        let surface = &mut *self.surface;
        match event {
            MapEvent::ZoomEnd => {
                let zoom = surface.zoom();
                self.renderer.on_zoom(zoom, surface);
            }
            MapEvent::PointerMoved(_) | MapEvent::PointerLeft => {
                self.coordinates.handle(&event, surface);
                let readout = self.coordinates.readout().clone();
                self.notify(ViewerEvent::CoordinatesChanged(readout));
            }
            MapEvent::Click(_) | MapEvent::ContextMenu(_) => {}
        }

        let surface = &mut *self.surface;
        for handler in &mut self.handlers {
            if handler.handle(&event, surface) == EventPropagation::Stop {
                return EventPropagation::Stop;
            }
        }

        EventPropagation::Propagate
    }

    fn layer_config(&self, layer: &LayerId) -> Result<&Arc<LayerConfig>, ViewerError> {
        self.layer_configs
            .iter()
            .find(|config| &config.id == layer)
            .ok_or_else(|| ViewerError::UnknownLayer(layer.clone()))
    }
}

async fn load_layer(source: Arc<dyn GeoJsonSource>, config: Arc<LayerConfig>) -> LoadCompletion {
    let result = load_features(&*source, &config.url).await;
    LoadCompletion {
        layer: config.id.clone(),
        result,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use ductomap_types::latlon;
    use futures::StreamExt;
    use parking_lot::Mutex;

    use super::*;
    use crate::error::LoadError;
    use crate::platform::MemorySource;
    use crate::surface::{RecordingSurface, SurfaceCall, SurfaceItem};

    const POSTES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-74.1, 4.6]},
             "properties": {"PK": "AB12", "TIPO": "Poste"}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-74.2, 4.7]},
             "properties": {"PK": "AB13", "TIPO": "Poste"}}
        ]
    }"#;

    const DUCTO: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "geometry": {"type": "LineString", "coordinates": [[-74.1, 4.6], [-74.0, 4.8]]},
             "properties": {"TRAMO": "North", "TRM_RML": "T1"}}
        ]
    }"#;

    const VEREDAS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "geometry": {"type": "Polygon", "coordinates": [[[-74.0, 4.0], [-73.0, 4.0], [-73.0, 5.0], [-74.0, 5.0], [-74.0, 4.0]]]},
             "properties": {"VEREDA": "La Esperanza"}}
        ]
    }"#;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_document("geojs/Edificacion_Cor_D2.geojson", POSTES)
            .with_document("geojs/Ducto_C1.geojson", DUCTO)
            .with_document("geojs/Ducto_C2.geojson", DUCTO)
            .with_document("geojs/Ducto C3.geojson", DUCTO)
            .with_document("geojs/Ducto_Turno4_Adicional.geojson", DUCTO)
            .with_document("geojs/VeredasT5.geojson", VEREDAS)
    }

    struct Fixture {
        viewer: MapViewModel,
        surface: RecordingSurface,
        events: Arc<Mutex<Vec<ViewerEvent>>>,
    }

    impl Fixture {
        fn new(source: MemorySource) -> Self {
            let _ = env_logger::builder().is_test(true).try_init();

            let surface = RecordingSurface::new(latlon!(0.0, 0.0), 2.0);
            let events = Arc::new(Mutex::new(Vec::new()));
            let recorded = events.clone();
            let viewer = MapViewModelBuilder::new(surface.clone())
                .with_config(ViewerConfig::corridor())
                .with_source(source)
                .with_subscriber(move |event: &ViewerEvent| recorded.lock().push(event.clone()))
                .build()
                .expect("valid config");

            Self {
                viewer,
                surface,
                events,
            }
        }

        fn loaded(source: MemorySource) -> Self {
            let mut fixture = Self::new(source);
            tokio_test::block_on(fixture.viewer.load_layers());
            fixture.surface.take_calls();
            fixture.events.lock().clear();
            fixture
        }

        fn events(&self) -> Vec<ViewerEvent> {
            std::mem::take(&mut *self.events.lock())
        }

        fn count(&self, layer: &str) -> usize {
            self.viewer.store().feature_count(&layer.into())
        }
    }

    fn is_marker(item: &SurfaceItem) -> bool {
        matches!(item, SurfaceItem::Marker { .. })
    }

    fn is_label(item: &SurfaceItem) -> bool {
        matches!(item, SurfaceItem::Label { .. })
    }

    #[test]
    fn build_sets_view_and_base_map() {
        let fixture = Fixture::new(source());
        assert_eq!(fixture.surface.center(), latlon!(4.5709, -74.2973));
        assert_eq!(fixture.surface.zoom(), 6.0);
        assert_eq!(
            fixture.viewer.base_maps().active().map(|b| b.id.as_str()),
            Some("osm")
        );
        assert_eq!(
            fixture.viewer.coordinates().readout().latitude,
            "4°34'15.24\"N"
        );
    }

    #[test]
    fn load_all_layers() {
        let mut fixture = Fixture::new(source());
        tokio_test::block_on(fixture.viewer.load_layers());

        assert_eq!(fixture.count("postes"), 2);
        assert_eq!(fixture.count("ducto_c4"), 1);
        assert_eq!(fixture.count("veredas"), 1);
        assert_eq!(fixture.surface.count(is_marker), 2);
        assert_eq!(fixture.surface.count(is_label), 0);

        let loaded = fixture
            .events()
            .into_iter()
            .filter(|e| matches!(e, ViewerEvent::LayerLoaded { .. }))
            .count();
        assert_eq!(loaded, 6);
    }

    #[test]
    fn failing_load_leaves_other_layers() {
        let failing = source().with_failure(
            "geojs/Ducto C3.geojson",
            LoadError::Http {
                url: "geojs/Ducto C3.geojson".into(),
                status: 404,
            },
        );
        let mut fixture = Fixture::new(failing);
        tokio_test::block_on(fixture.viewer.load_layers());

        assert_eq!(fixture.count("ducto_c3"), 0);
        assert_eq!(fixture.count("postes"), 2);
        assert_eq!(fixture.count("ducto_c1"), 1);
        assert_eq!(fixture.count("ducto_c2"), 1);
        assert_eq!(fixture.count("ducto_c4"), 1);
        assert_eq!(fixture.count("veredas"), 1);

        let failed: Vec<_> = fixture
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ViewerEvent::LayerLoadFailed { layer, error } => Some((layer, error)),
                _ => None,
            })
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0.as_str(), "ducto_c3");
        assert_matches!(failed[0].1, LoadError::Http { status: 404, .. });
    }

    #[test]
    fn failed_reload_keeps_content() {
        let mut fixture = Fixture::loaded(source());
        fixture.viewer.apply_load(LoadCompletion {
            layer: "postes".into(),
            result: Err(LoadError::Decode("truncated".into())),
        });

        assert_eq!(fixture.count("postes"), 2);
        assert_eq!(fixture.surface.count(is_marker), 2);
    }

    #[test]
    fn reload_replaces_items() {
        let mut fixture = Fixture::loaded(source());
        fixture
            .viewer
            .set_label_group_visible(LabelGroup::Point, true);
        assert_eq!(fixture.surface.count(is_label), 2);

        tokio_test::block_on(fixture.viewer.reload_layer(&"postes".into())).expect("known layer");
        assert_eq!(fixture.count("postes"), 2);
        assert_eq!(fixture.surface.count(is_marker), 2);
        assert_eq!(fixture.surface.count(is_label), 2);

        let unknown = tokio_test::block_on(fixture.viewer.reload_layer(&"rios".into()));
        assert_matches!(unknown, Err(ViewerError::UnknownLayer(_)));
    }

    #[test]
    fn missing_document() {
        let mut fixture = Fixture::new(MemorySource::new().with_document(
            "geojs/VeredasT5.geojson",
            VEREDAS,
        ));
        tokio_test::block_on(fixture.viewer.load_layers());

        assert_eq!(fixture.count("veredas"), 1);
        let not_found = fixture
            .events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    ViewerEvent::LayerLoadFailed {
                        error: LoadError::NotFound(_),
                        ..
                    }
                )
            })
            .count();
        assert_eq!(not_found, 5);
    }

    #[test]
    fn spawned_loads() {
        let mut fixture = Fixture::new(source());
        tokio_test::block_on(async {
            let mut receiver = fixture.viewer.spawn_loads();
            while let Some(completion) = receiver.next().await {
                fixture.viewer.apply_load(completion);
            }
        });

        assert_eq!(fixture.count("postes"), 2);
        assert_eq!(fixture.count("veredas"), 1);
    }

    #[test]
    fn clear_layer_is_idempotent() {
        let mut fixture = Fixture::loaded(source());
        fixture.viewer.set_label_group_visible(LabelGroup::Point, true);

        fixture.viewer.clear_layer(&"postes".into()).expect("known layer");
        fixture.viewer.clear_layer(&"postes".into()).expect("known layer");
        assert_eq!(fixture.count("postes"), 0);
        assert_eq!(fixture.surface.count(is_marker), 0);
        assert_eq!(fixture.surface.count(is_label), 0);
        assert_eq!(fixture.count("veredas"), 1);

        assert_matches!(
            fixture.viewer.clear_layer(&"rios".into()),
            Err(ViewerError::UnknownLayer(_))
        );
    }

    #[test]
    fn layer_visibility() {
        let mut fixture = Fixture::loaded(source());
        fixture
            .viewer
            .set_layer_visible(&"postes".into(), false)
            .expect("known layer");
        assert_eq!(fixture.surface.count(is_marker), 0);

        fixture
            .viewer
            .set_layer_visible(&"postes".into(), false)
            .expect("known layer");
        fixture
            .viewer
            .set_layer_visible(&"postes".into(), true)
            .expect("known layer");
        assert_eq!(fixture.surface.count(is_marker), 2);

        let changes = fixture
            .events()
            .into_iter()
            .filter(|e| matches!(e, ViewerEvent::LayerVisibilityChanged { .. }))
            .count();
        assert_eq!(changes, 2);
    }

    #[test]
    fn label_groups_follow_toggles() {
        let mut fixture = Fixture::loaded(source());
        assert_eq!(fixture.surface.count(is_label), 0);

        fixture
            .viewer
            .set_label_group_visible(LabelGroup::Polyline, true);
        assert_eq!(fixture.surface.count(is_label), 4);

        fixture
            .viewer
            .set_label_group_visible(LabelGroup::Polygon, true);
        assert_eq!(fixture.surface.count(is_label), 5);

        fixture
            .viewer
            .set_label_group_visible(LabelGroup::Polyline, false);
        let labels: Vec<_> = fixture
            .surface
            .items()
            .into_iter()
            .filter_map(|(_, item)| match item {
                SurfaceItem::Label { text, .. } => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["La Esperanza"]);

        assert_eq!(
            fixture.events(),
            [
                ViewerEvent::LabelGroupVisibilityChanged {
                    group: LabelGroup::Polyline,
                    visible: true
                },
                ViewerEvent::LabelGroupVisibilityChanged {
                    group: LabelGroup::Polygon,
                    visible: true
                },
                ViewerEvent::LabelGroupVisibilityChanged {
                    group: LabelGroup::Polyline,
                    visible: false
                },
            ]
        );
    }

    #[test]
    fn zoom_end_resizes_point_icons() {
        let mut fixture = Fixture::loaded(source());
        fixture.surface.set_zoom(18.0);
        fixture.viewer.handle_event(MapEvent::ZoomEnd);

        let resized = fixture
            .surface
            .calls()
            .into_iter()
            .filter(|call| matches!(call, SurfaceCall::SetMarkerIcon(_, icon) if icon.size == 17.0))
            .count();
        assert_eq!(resized, 2);
    }

    #[test]
    fn measurement_through_events() {
        let mut fixture = Fixture::loaded(source());

        assert!(fixture.viewer.toggle_measurement());
        assert_eq!(
            fixture.viewer.handle_event(MapEvent::Click(latlon!(0.0, 0.0))),
            EventPropagation::Stop
        );
        fixture
            .viewer
            .handle_event(MapEvent::Click(latlon!(0.0, 1.0)));
        assert!(fixture.viewer.measurement().total_km() > 111.0);

        fixture
            .viewer
            .handle_event(MapEvent::ContextMenu(latlon!(0.0, 1.0)));
        assert!(!fixture.viewer.measurement().is_active());
        assert_eq!(fixture.viewer.measurement().total_km(), 0.0);

        let snapshots: Vec<_> = fixture
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ViewerEvent::MeasurementUpdated(snapshot) => Some(snapshot),
                _ => None,
            })
            .collect();
        assert_eq!(snapshots.len(), 4);
        assert_eq!(snapshots[2].point_count, 2);
        assert!(!snapshots[3].active);
    }

    #[test]
    fn start_discards_previous_measurement() {
        let mut fixture = Fixture::loaded(source());
        fixture.viewer.start_measurement();
        fixture
            .viewer
            .handle_event(MapEvent::Click(latlon!(0.0, 0.0)));
        fixture
            .viewer
            .handle_event(MapEvent::Click(latlon!(0.0, 1.0)));

        fixture.viewer.start_measurement();
        assert!(fixture.viewer.measurement().points().is_empty());
        assert_eq!(
            fixture
                .surface
                .count(|item| matches!(item, SurfaceItem::Path { .. } | SurfaceItem::Callout { .. })),
            0
        );

        fixture.viewer.stop_measurement();
        assert!(!fixture.viewer.measurement().is_active());
    }

    #[test]
    fn search_and_focus() {
        let mut fixture = Fixture::loaded(source());
        let outcome = fixture.viewer.search("ab12");
        assert_eq!(outcome.results().len(), 1);

        fixture
            .viewer
            .focus(&outcome.results()[0])
            .expect("feature exists");
        assert_eq!(
            fixture.surface.calls()[0],
            SurfaceCall::SetView(latlon!(4.6, -74.1), 17.0)
        );

        assert_eq!(
            fixture.events(),
            [ViewerEvent::SearchCompleted {
                query: "ab12".into(),
                result_count: 1
            }]
        );
        assert_eq!(fixture.viewer.search(""), SearchOutcome::NoQuery);
    }

    #[test]
    fn focus_failure_keeps_query() {
        let mut fixture = Fixture::loaded(source());
        let outcome = fixture.viewer.search("AB13");
        fixture.viewer.clear_layer(&"postes".into()).expect("known layer");
        fixture.events();

        let result = fixture.viewer.focus(&outcome.results()[0]);
        assert_matches!(result, Err(ViewerError::SearchExecution(_)));
        assert_eq!(fixture.viewer.last_query(), Some("AB13"));
        assert_matches!(
            fixture.events().as_slice(),
            [ViewerEvent::SearchFailed { query, .. }] if query == "AB13"
        );
    }

    #[test]
    fn focus_on_result_from_before_reload() {
        let mut fixture = Fixture::loaded(source());
        let outcome = fixture.viewer.search("AB12");
        let replacement = br#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-70.0, 10.0]},
                 "properties": {"PK": "ZZ99"}}
            ]
        }"#;
        fixture.viewer.apply_load(LoadCompletion {
            layer: "postes".into(),
            result: crate::decode_features(&bytes::Bytes::from_static(replacement)),
        });
        fixture.surface.take_calls();
        fixture.events();

        let result = fixture.viewer.focus(&outcome.results()[0]);
        assert_matches!(result, Err(ViewerError::SearchExecution(_)));
        let calls = fixture.surface.calls();
        assert!(!calls
            .iter()
            .any(|c| matches!(c, SurfaceCall::SetView(..) | SurfaceCall::OpenPopup(_))));
        assert_eq!(fixture.count("postes"), 1);
    }

    #[test]
    fn coordinates_follow_pointer() {
        let mut fixture = Fixture::loaded(source());
        fixture
            .viewer
            .handle_event(MapEvent::PointerMoved(latlon!(-0.5, 10.0)));
        assert_eq!(
            fixture.viewer.coordinates().readout().latitude,
            "0°30'00.00\"S"
        );

        fixture.viewer.set_coordinate_format(CoordinateFormat::Decimal);
        assert_eq!(
            fixture.viewer.coordinates().readout().longitude,
            "-74.297300°"
        );

        fixture.viewer.handle_event(MapEvent::PointerLeft);
        let changes = fixture
            .events()
            .into_iter()
            .filter(|e| matches!(e, ViewerEvent::CoordinatesChanged(_)))
            .count();
        assert_eq!(changes, 3);
    }

    #[test]
    fn switch_base_map() {
        let mut fixture = Fixture::new(source());
        fixture.viewer.set_base_map("esri_satellite").expect("known base map");
        assert!(fixture
            .viewer
            .attribution()
            .is_some_and(|a| a.text().contains("Esri")));
        assert_matches!(
            fixture.viewer.set_base_map("topo"),
            Err(ViewerError::UnknownBaseMap(_))
        );
        assert_eq!(
            fixture.events(),
            [ViewerEvent::BaseMapChanged {
                id: "esri_satellite".into()
            }]
        );
    }

    #[test]
    fn extra_handlers_get_unhandled_events() {
        let mut fixture = Fixture::loaded(source());
        let clicks = Arc::new(Mutex::new(0));
        let counter = clicks.clone();
        fixture
            .viewer
            .add_event_handler(move |event: &MapEvent, _: &mut dyn MapSurface| {
                if matches!(event, MapEvent::Click(_)) {
                    *counter.lock() += 1;
                }
                EventPropagation::Propagate
            });

        fixture
            .viewer
            .handle_event(MapEvent::Click(latlon!(0.0, 0.0)));
        fixture.viewer.start_measurement();
        fixture
            .viewer
            .handle_event(MapEvent::Click(latlon!(0.0, 0.0)));

        assert_eq!(*clicks.lock(), 1);
    }
}
