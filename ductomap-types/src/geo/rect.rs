use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, GeoPoint2d, NewGeoPoint};

/// Geographic bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    /// Southern edge.
    pub lat_min: f64,
    /// Western edge.
    pub lon_min: f64,
    /// Northern edge.
    pub lat_max: f64,
    /// Eastern edge.
    pub lon_max: f64,
}

impl GeoRect {
    /// Creates a new rect. The values are not normalized.
    pub fn new(lat_min: f64, lon_min: f64, lat_max: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lon_min,
            lat_max,
            lon_max,
        }
    }

    /// Degenerate rect containing a single point.
    pub fn from_point(p: &impl GeoPoint<Num = f64>) -> Self {
        Self {
            lat_min: p.lat(),
            lon_min: p.lon(),
            lat_max: p.lat(),
            lon_max: p.lon(),
        }
    }

    /// Smallest rect containing all the points. Returns `None` for an empty iterator.
    pub fn from_points<'a, P: GeoPoint<Num = f64> + 'a>(
        mut points: impl Iterator<Item = &'a P>,
    ) -> Option<Self> {
        let first = points.next()?;
        let mut rect = Self::from_point(first);
        for p in points {
            rect.lat_min = rect.lat_min.min(p.lat());
            rect.lon_min = rect.lon_min.min(p.lon());
            rect.lat_max = rect.lat_max.max(p.lat());
            rect.lon_max = rect.lon_max.max(p.lon());
        }

        Some(rect)
    }

    /// Centre of the rect: the midpoint of its latitude and longitude ranges.
    pub fn center(&self) -> GeoPoint2d {
        GeoPoint2d::latlon(
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }

    /// Returns true if the point lies inside the rect or on its edge.
    pub fn contains(&self, p: &impl GeoPoint<Num = f64>) -> bool {
        p.lat() >= self.lat_min
            && p.lat() <= self.lat_max
            && p.lon() >= self.lon_min
            && p.lon() <= self.lon_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latlon;
    use approx::assert_relative_eq;

    #[test]
    fn from_points_and_center() {
        let points = [latlon!(4.0, -74.0), latlon!(6.0, -75.0), latlon!(5.0, -73.0)];
        let rect = GeoRect::from_points(points.iter()).expect("not empty");
        assert_eq!(rect, GeoRect::new(4.0, -75.0, 6.0, -73.0));

        let center = rect.center();
        assert_relative_eq!(center.lat(), 5.0);
        assert_relative_eq!(center.lon(), -74.0);
    }

    #[test]
    fn from_no_points() {
        let points: [GeoPoint2d; 0] = [];
        assert!(GeoRect::from_points(points.iter()).is_none());
    }

    #[test]
    fn contains_edges() {
        let rect = GeoRect::new(0.0, 0.0, 1.0, 1.0);
        assert!(rect.contains(&latlon!(1.0, 0.5)));
        assert!(!rect.contains(&latlon!(-0.5, 0.5)));
    }
}
