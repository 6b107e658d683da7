use serde::{Deserialize, Serialize};

/// Sequence of points forming a line.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Contour<Point> {
    points: Vec<Point>,
}

impl<Point> std::ops::Deref for Contour<Point> {
    type Target = Vec<Point>;

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl<Point> Contour<Point> {
    /// Creates a new contour.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Iterates over the points of the contour.
    pub fn iter_points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.points.iter()
    }
}

/// Contour with an implicit closing segment, used as a polygon ring.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClosedContour<Point> {
    /// Ring points. The first point is not repeated at the end.
    pub points: Vec<Point>,
}

impl<Point> ClosedContour<Point> {
    /// Creates a new ring.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Iterates over the points of the ring.
    pub fn iter_points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.points.iter()
    }
}
