//! Ductomap is the annotation and interaction core of a thematic map viewer for a pipeline
//! right-of-way. It loads GeoJSON layers (posts, pipeline sections, rural districts), draws them with
//! popups and optional labels, measures polyline distances, shows the pointer coordinates and
//! searches feature properties.
//!
//! # Quick start
//!
//! ```no_run
//! use ductomap::config::ViewerConfig;
//! use ductomap::label::LabelGroup;
//! use ductomap::surface::RecordingSurface;
//! use ductomap::ductomap_types::latlon;
//! use ductomap::MapViewModelBuilder;
//!
//! # tokio_test::block_on(async {
//! let mut viewer = MapViewModelBuilder::new(RecordingSurface::new(latlon!(0.0, 0.0), 2.0))
//!     .with_config(ViewerConfig::corridor())
//!     .with_subscriber(|event: &ductomap::subscriber::ViewerEvent| println!("{event:?}"))
//!     .build()
//!     .unwrap();
//!
//! viewer.load_layers().await;
//! viewer.set_label_group_visible(LabelGroup::Polygon, true);
//! let outcome = viewer.search("ab12");
//! # });
//! ```
//!
//! # Main components
//!
//! * [`MapViewModel`] owns the state of a viewer and is the entry point for every user action.
//!   It is created by the [`MapViewModelBuilder`] from a [`ViewerConfig`](config::ViewerConfig).
//! * The [`GeometryStore`](layer::GeometryStore) keeps the features of every
//!   [`layer`], loaded through a [`GeoJsonSource`](platform::GeoJsonSource).
//! * The [`LayerRenderer`](render::LayerRenderer) turns features into items on a
//!   [`MapSurface`](surface::MapSurface), the map widget of the embedding application.
//! * The [`LabelAnnotator`](label::LabelAnnotator), the
//!   [`MeasurementSession`](measure::MeasurementSession), the
//!   [`FeatureSearchIndex`](search::FeatureSearchIndex) and the
//!   [`CoordinateDisplay`](coordinates::CoordinateDisplay) implement the interactive tools.
//!
//! Changes are reported to [`Subscriber`](subscriber::Subscriber)s as
//! [`ViewerEvent`](subscriber::ViewerEvent)s.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub(crate) mod async_runtime;
mod color;
pub mod config;
pub mod control;
pub mod coordinates;
pub mod error;
pub mod label;
pub mod layer;
mod map;
pub mod measure;
pub mod platform;
pub mod render;
pub mod search;
pub mod subscriber;
pub mod surface;

pub use color::Color;
pub use error::{LoadError, ViewerError};
pub use layer::loader::{decode_features, LoadCompletion};
pub use map::{BaseMapCollection, MapViewModel, MapViewModelBuilder};

// Reexport ductomap_types
pub use ductomap_types;
