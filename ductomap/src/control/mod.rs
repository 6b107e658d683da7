//! Interactivity of the viewer.
//!
//! The embedding map widget converts its native events (clicks, right clicks, zoom and pointer
//! movement) into [`MapEvent`]s and hands them to
//! [`MapViewModel::handle_event`](crate::MapViewModel::handle_event). The view model passes
//! every event to its [`MapEventHandler`]s in order until one of them stops the propagation.

use ductomap_types::geo::GeoPoint2d;

use crate::surface::MapSurface;

/// Map interaction event, in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Primary button click at the point.
    Click(GeoPoint2d),
    /// Context menu request (right click or long press) at the point.
    ContextMenu(GeoPoint2d),
    /// A zoom animation finished. The new zoom is read from the surface.
    ZoomEnd,
    /// Pointer moved over the map.
    PointerMoved(GeoPoint2d),
    /// Pointer left the map.
    PointerLeft,
}

/// Value returned by a [`MapEventHandler`] to indicate the status of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPropagation {
    /// Event should be propagated to the next handler.
    Propagate,
    /// Event should not be propagated to the next handler.
    Stop,
}

/// Map event handler.
pub trait MapEventHandler {
    /// Handle the event.
    fn handle(&mut self, event: &MapEvent, surface: &mut dyn MapSurface) -> EventPropagation;
}

impl<T: FnMut(&MapEvent, &mut dyn MapSurface) -> EventPropagation> MapEventHandler for T {
    fn handle(&mut self, event: &MapEvent, surface: &mut dyn MapSurface) -> EventPropagation {
        self(event, surface)
    }
}
