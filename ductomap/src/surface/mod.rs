//! The map widget the viewer draws on, seen through the narrow [`MapSurface`] interface.
//!
//! The viewer never renders anything itself. It describes what should be on the map as
//! [`SurfaceItem`]s, each under an [`ItemId`], and tells the surface to add, update or remove them.
//! A web build implements [`MapSurface`] on top of the page's map library, tests use the
//! [`RecordingSurface`].

use std::sync::atomic::{AtomicU64, Ordering};

use ductomap_types::geo::{GeoPoint2d, GeoRect};
use ductomap_types::{Geom, GeometryKind};
use maybe_sync::{MaybeSend, MaybeSync};

use crate::layer::attribution::Attribution;
use crate::layer::Style;
use crate::Color;

#[cfg(any(test, feature = "_tests"))]
mod recording;

#[cfg(any(test, feature = "_tests"))]
pub use recording::{RecordingSurface, SurfaceCall};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of an item on the surface. Unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    /// Returns a new unique id.
    pub fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Drawing plane of an item. Items of a pane with a higher z-index are drawn above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    /// Base map tiles.
    Tiles,
    /// Polygon layers.
    Polygons,
    /// Polyline layers.
    Polylines,
    /// Point layers.
    Points,
    /// Labels, measurement path and callouts.
    Overlay,
}

impl Pane {
    /// Pane the features of a layer of the given kind are drawn in.
    pub fn for_kind(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Polygon => Self::Polygons,
            GeometryKind::Polyline => Self::Polylines,
            GeometryKind::Point => Self::Points,
        }
    }

    /// Stacking order of the pane.
    pub fn z_index(&self) -> u32 {
        match self {
            Self::Tiles => 100,
            Self::Polygons => 200,
            Self::Polylines => 400,
            Self::Points => 600,
            Self::Overlay => 650,
        }
    }
}

/// Size and anchoring of a point marker icon, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconSpec {
    /// Width and height of the icon.
    pub size: f64,
    /// Offset of the icon point that sits on the marker position, from the top-left corner.
    pub anchor: [f64; 2],
    /// Offset of the popup tip from the anchor.
    pub popup_anchor: [f64; 2],
}

/// Popup bound to an item: one line per feature property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    /// Lines in display order.
    pub lines: Vec<String>,
}

impl Popup {
    /// Popup text with lines separated by `\n`.
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }
}

/// Options of [`MapSurface::fit_bounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Space left around the bounds, in pixels.
    pub padding: f64,
    /// The view is never zoomed in further than this.
    pub max_zoom: f64,
}

/// Everything the viewer can put on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceItem {
    /// Icon marker of a point layer feature.
    Marker {
        /// Marker position.
        position: GeoPoint2d,
        /// Icon size and anchors.
        icon: IconSpec,
        /// Drawing pane.
        pane: Pane,
        /// Popup opened on click.
        popup: Option<Popup>,
    },
    /// Styled circle for a point geometry in a line or polygon layer.
    CircleMarker {
        /// Circle centre.
        position: GeoPoint2d,
        /// Stroke and fill.
        style: Style,
        /// Drawing pane.
        pane: Pane,
        /// Popup opened on click.
        popup: Option<Popup>,
    },
    /// Styled line or polygon.
    Shape {
        /// Geometry to draw.
        geometry: Geom,
        /// Stroke and fill.
        style: Style,
        /// Drawing pane.
        pane: Pane,
        /// Popup opened on click.
        popup: Option<Popup>,
    },
    /// Non-interactive text label.
    Label {
        /// Centre of the label box.
        position: GeoPoint2d,
        /// Label text.
        text: String,
        /// Text color.
        color: Color,
        /// Width and height of the label box in pixels.
        box_size: [u32; 2],
    },
    /// Measurement path.
    Path {
        /// Vertices in order.
        points: Vec<GeoPoint2d>,
        /// Stroke color.
        color: Color,
        /// Stroke width in pixels.
        weight: f64,
    },
    /// Permanent tooltip above a point.
    Callout {
        /// Tooltip position.
        position: GeoPoint2d,
        /// Tooltip text, lines separated by `\n`.
        text: String,
    },
    /// Raster base map.
    TileLayer {
        /// Tile url template.
        url_template: String,
        /// Credit for the tiles.
        attribution: Attribution,
    },
}

impl SurfaceItem {
    /// Pane the item is drawn in.
    pub fn pane(&self) -> Pane {
        match self {
            Self::Marker { pane, .. } | Self::CircleMarker { pane, .. } | Self::Shape { pane, .. } => {
                *pane
            }
            Self::Label { .. } | Self::Path { .. } | Self::Callout { .. } => Pane::Overlay,
            Self::TileLayer { .. } => Pane::Tiles,
        }
    }

    /// Popup bound to the item.
    pub fn popup(&self) -> Option<&Popup> {
        match self {
            Self::Marker { popup, .. }
            | Self::CircleMarker { popup, .. }
            | Self::Shape { popup, .. } => popup.as_ref(),
            _ => None,
        }
    }
}

/// Map widget the viewer draws on.
///
/// Adding an item under an id that is already on the surface replaces it. Removing or updating an
/// item that is not on the surface does nothing.
pub trait MapSurface: MaybeSend + MaybeSync {
    /// Puts the item on the map.
    fn add_item(&mut self, id: ItemId, item: &SurfaceItem);
    /// Takes the item off the map.
    fn remove_item(&mut self, id: ItemId);
    /// Changes the icon of a marker.
    fn set_marker_icon(&mut self, id: ItemId, icon: &IconSpec);
    /// Replaces the vertices of a path.
    fn set_path_points(&mut self, id: ItemId, points: &[GeoPoint2d]);
    /// Opens the popup bound to the item.
    fn open_popup(&mut self, id: ItemId);
    /// Moves and zooms the view so that `bounds` is visible.
    fn fit_bounds(&mut self, bounds: &GeoRect, options: FitOptions);
    /// Sets the view centre and zoom.
    fn set_view(&mut self, center: GeoPoint2d, zoom: f64);
    /// Current zoom level.
    fn zoom(&self) -> f64;
    /// Current view centre.
    fn center(&self) -> GeoPoint2d;
}
