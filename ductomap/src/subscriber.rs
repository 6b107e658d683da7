//! Notifications about viewer state changes, for the UI around the map.

use maybe_sync::{MaybeSend, MaybeSync};

use crate::coordinates::CoordinateReadout;
use crate::error::LoadError;
use crate::label::LabelGroup;
use crate::layer::LayerId;
use crate::measure::MeasurementSnapshot;

/// Something that changed in a [`MapViewModel`](crate::MapViewModel).
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// A layer's features were loaded and drawn.
    LayerLoaded {
        /// Loaded layer.
        layer: LayerId,
        /// Number of loaded features.
        feature_count: usize,
        /// Number of features that were not drawn because of invalid geometry.
        skipped: usize,
    },
    /// A layer could not be loaded. The layer keeps its previous content.
    LayerLoadFailed {
        /// Layer that failed.
        layer: LayerId,
        /// Cause of the failure.
        error: LoadError,
    },
    /// A layer was shown or hidden.
    LayerVisibilityChanged {
        /// Changed layer.
        layer: LayerId,
        /// New visibility.
        visible: bool,
    },
    /// A label group was shown or hidden.
    LabelGroupVisibilityChanged {
        /// Changed group.
        group: LabelGroup,
        /// New visibility.
        visible: bool,
    },
    /// The measurement was started, stopped or extended.
    MeasurementUpdated(MeasurementSnapshot),
    /// A search finished.
    SearchCompleted {
        /// Normalized query. Empty if there was nothing to search for.
        query: String,
        /// Number of results.
        result_count: usize,
    },
    /// Focusing on a search result failed.
    SearchFailed {
        /// Query that produced the result.
        query: String,
        /// Description of the failure.
        reason: String,
    },
    /// Another base map was activated.
    BaseMapChanged {
        /// Id of the active base map.
        id: String,
    },
    /// The coordinate readout changed.
    CoordinatesChanged(CoordinateReadout),
}

/// Receiver of [`ViewerEvent`]s.
pub trait Subscriber: MaybeSend + MaybeSync {
    /// Called after the change has been applied.
    fn notify(&self, event: &ViewerEvent);
}

impl<T: Fn(&ViewerEvent) + MaybeSend + MaybeSync> Subscriber for T {
    fn notify(&self, event: &ViewerEvent) {
        self(event)
    }
}
