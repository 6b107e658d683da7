//! Geometry model of a map feature.

use serde::{Deserialize, Serialize};

use crate::contour::Contour;
use crate::geo::{GeoPoint, GeoPoint2d, GeoRect};
use crate::polygon::Polygon;

/// Kind of geometry a thematic layer holds. Decides how features are drawn, where their labels are
/// anchored and which label group they join.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    /// Points and multipoints.
    Point,
    /// Line strings and multi line strings.
    Polyline,
    /// Polygons and multipolygons.
    Polygon,
}

/// Any geometry a feature can have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geom<P = GeoPoint2d> {
    /// Point.
    Point(P),
    /// Set of points.
    MultiPoint(Vec<P>),
    /// Line.
    Contour(Contour<P>),
    /// Set of lines.
    MultiContour(Vec<Contour<P>>),
    /// Polygon.
    Polygon(Polygon<P>),
    /// Set of polygons.
    MultiPolygon(Vec<Polygon<P>>),
}

impl<P> Geom<P> {
    /// Geometry kind of this geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geom::Point(_) | Geom::MultiPoint(_) => GeometryKind::Point,
            Geom::Contour(_) | Geom::MultiContour(_) => GeometryKind::Polyline,
            Geom::Polygon(_) | Geom::MultiPolygon(_) => GeometryKind::Polygon,
        }
    }

    /// A single point has no extent. Every other geometry is treated as an area that a view can be
    /// fitted to.
    pub fn has_extent(&self) -> bool {
        !matches!(self, Geom::Point(_))
    }

    /// Iterates over every vertex of the geometry.
    pub fn iter_points(&self) -> Box<dyn Iterator<Item = &P> + '_> {
        match self {
            Geom::Point(p) => Box::new(std::iter::once(p)),
            Geom::MultiPoint(points) => Box::new(points.iter()),
            Geom::Contour(contour) => Box::new(contour.iter_points()),
            Geom::MultiContour(contours) => Box::new(contours.iter().flat_map(|c| c.iter_points())),
            Geom::Polygon(polygon) => Box::new(polygon.iter_points()),
            Geom::MultiPolygon(polygons) => Box::new(polygons.iter().flat_map(|p| p.iter_points())),
        }
    }
}

impl<P: GeoPoint<Num = f64>> Geom<P> {
    /// Bounding box of all vertices. `None` if the geometry has no points.
    pub fn bounding_rect(&self) -> Option<GeoRect> {
        GeoRect::from_points(self.iter_points())
    }

    /// The point itself for a point geometry, the bounds centre for everything else.
    pub fn anchor(&self) -> Option<GeoPoint2d> {
        match self {
            Geom::Point(p) => Some(GeoPoint2d::from(p)),
            _ => self.bounding_rect().map(|rect| rect.center()),
        }
    }
}

impl From<GeoPoint2d> for Geom {
    fn from(value: GeoPoint2d) -> Self {
        Geom::Point(value)
    }
}
