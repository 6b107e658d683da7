use std::sync::Arc;

use log::warn;

use super::{BaseMapCollection, MapViewModel};
use crate::config::ViewerConfig;
use crate::control::MapEventHandler;
use crate::coordinates::CoordinateDisplay;
use crate::error::ViewerError;
use crate::label::LabelAnnotator;
use crate::layer::GeometryStore;
use crate::measure::MeasurementSession;
use crate::platform::{GeoJsonSource, PlatformSource};
use crate::render::LayerRenderer;
use crate::search::FeatureSearchIndex;
use crate::subscriber::Subscriber;
use crate::surface::MapSurface;

/// Convenience type to initialize a [`MapViewModel`].
///
/// ```
/// use ductomap::config::ViewerConfig;
/// use ductomap::surface::RecordingSurface;
/// use ductomap::MapViewModelBuilder;
/// use ductomap::ductomap_types::latlon;
///
/// let surface = RecordingSurface::new(latlon!(0.0, 0.0), 2.0);
/// let viewer = MapViewModelBuilder::new(surface)
///     .with_config(ViewerConfig::corridor())
///     .build()
///     .unwrap();
/// ```
pub struct MapViewModelBuilder {
    surface: Box<dyn MapSurface>,
    config: Option<ViewerConfig>,
    source: Option<Arc<dyn GeoJsonSource>>,
    handlers: Vec<Box<dyn MapEventHandler>>,
    subscribers: Vec<Box<dyn Subscriber>>,
}

impl MapViewModelBuilder {
    /// Starts building a viewer that draws on `surface`.
    pub fn new(surface: impl MapSurface + 'static) -> Self {
        Self {
            surface: Box::new(surface),
            config: None,
            source: None,
            handlers: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Sets the viewer configuration.
    ///
    /// Defaults to [`ViewerConfig::corridor`].
    pub fn with_config(mut self, config: ViewerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the source layer documents are loaded from.
    ///
    /// Defaults to the [`PlatformSource`] of the target.
    pub fn with_source(mut self, source: impl GeoJsonSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Adds a map event handler called after the built-in tools.
    pub fn with_event_handler(mut self, handler: impl MapEventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Adds a receiver of viewer events.
    pub fn with_subscriber(mut self, subscriber: impl Subscriber + 'static) -> Self {
        self.subscribers.push(Box::new(subscriber));
        self
    }

    /// Validates the configuration, sets the initial view and activates the default base map.
    pub fn build(self) -> Result<MapViewModel, ViewerError> {
        let Self {
            mut surface,
            config,
            source,
            handlers,
            subscribers,
        } = self;

        let config = config.unwrap_or_else(ViewerConfig::corridor);
        config.validate()?;

        surface.set_view(config.view.center, config.view.zoom);

        let mut base_maps = BaseMapCollection::new(config.base_maps.clone());
        let default_base_map = config
            .default_base_map
            .clone()
            .or_else(|| config.base_maps.first().map(|base_map| base_map.id.clone()));
        if let Some(id) = default_base_map {
            base_maps.activate(&id, &mut *surface)?;
        } else {
            warn!("No base map configured");
        }

        let layer_configs = config.shared_layers();

        Ok(MapViewModel {
            store: GeometryStore::new(layer_configs.iter().cloned()),
            renderer: LayerRenderer::new(&config.layers, surface.zoom()),
            labels: LabelAnnotator::new(config.labels),
            measurement: MeasurementSession::new(),
            search: FeatureSearchIndex::new(config.effective_search_order()),
            last_query: None,
            coordinates: CoordinateDisplay::new(config.coordinate_format, surface.center()),
            base_maps,
            source: source
                .unwrap_or_else(|| Arc::new(PlatformSource::new()) as Arc<dyn GeoJsonSource>),
            layer_configs,
            config,
            surface,
            handlers,
            subscribers,
        })
    }
}
