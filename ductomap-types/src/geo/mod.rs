//! Types for geographic coordinates: points, bounds and the datum used to measure distances.

mod datum;
mod point;
mod rect;

pub use datum::Datum;
pub use point::{GeoPoint, GeoPoint2d, NewGeoPoint};
pub use rect::GeoRect;
