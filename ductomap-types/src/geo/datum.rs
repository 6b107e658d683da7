/// Spherical model of the Earth used for distance calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    radius: f64,
}

impl Datum {
    /// Sphere with the 6 371 km radius that web map libraries use for their distance readouts.
    pub const EARTH_SPHERE: Self = Datum::sphere(6_371_000.0);

    /// Creates a spherical datum with the given radius in meters.
    pub const fn sphere(radius: f64) -> Self {
        Self { radius }
    }

    /// Radius of the sphere in meters.
    pub fn mean_radius(&self) -> f64 {
        self.radius
    }
}
