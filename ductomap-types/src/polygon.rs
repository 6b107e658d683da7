use serde::{Deserialize, Serialize};

use crate::contour::ClosedContour;

/// Polygon with an outer ring and optional holes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Polygon<P> {
    /// Outer contour.
    pub outer_contour: ClosedContour<P>,
    /// Inner contours.
    pub inner_contours: Vec<ClosedContour<P>>,
}

impl<P> Polygon<P> {
    /// Creates a new polygon.
    pub fn new(outer_contour: ClosedContour<P>, inner_contours: Vec<ClosedContour<P>>) -> Self {
        Self {
            outer_contour,
            inner_contours,
        }
    }

    /// Iterates over the points of all rings, outer ring first.
    pub fn iter_points(&self) -> impl Iterator<Item = &P> + '_ {
        self.outer_contour
            .iter_points()
            .chain(self.inner_contours.iter().flat_map(|c| c.iter_points()))
    }
}
