//! Geometry types shared by the ductomap viewer core.
//!
//! The crate provides:
//! * geographic points ([`geo::GeoPoint2d`]) with great-circle distance on a [`geo::Datum`],
//! * geographic bounds ([`geo::GeoRect`]) with centre calculation used for label anchors and
//!   zoom-to-feature,
//! * a small geometry model ([`Geom`]) covering everything a GeoJSON layer of the viewer can contain,
//! * conversion from [`geojson`](https://docs.rs/geojson) geometries (behind the `geojson` feature).

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod contour;
pub mod error;
pub mod geo;
pub mod geometry;
mod polygon;

#[cfg(feature = "geojson")]
pub mod geojson;

pub use contour::{ClosedContour, Contour};
pub use geometry::{Geom, GeometryKind};
pub use polygon::Polygon;
