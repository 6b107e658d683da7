use num_traits::{Float, NumCast, One};
use serde::{Deserialize, Serialize};

use crate::geo::Datum;

/// A point on the surface of the Earth, in degrees.
pub trait GeoPoint {
    /// Numeric type used to represent coordinates.
    type Num: Float;

    /// Latitude in degrees.
    fn lat(&self) -> Self::Num;
    /// Longitude in degrees.
    fn lon(&self) -> Self::Num;

    /// Latitude in radians.
    fn lat_rad(&self) -> Self::Num {
        self.lat().to_radians()
    }

    /// Longitude in radians.
    fn lon_rad(&self) -> Self::Num {
        self.lon().to_radians()
    }

    /// Great-circle (haversine) distance to `other` in meters, using the mean radius of `datum`.
    ///
    /// Returns `None` only if the datum radius cannot be represented by `Self::Num`.
    fn distance(&self, other: &impl GeoPoint<Num = Self::Num>, datum: &Datum) -> Option<Self::Num> {
        let one = Self::Num::one();
        let two = one + one;
        let radius: Self::Num = NumCast::from(datum.mean_radius())?;

        let sin_d_lat = ((other.lat_rad() - self.lat_rad()) / two).sin();
        let sin_d_lon = ((other.lon_rad() - self.lon_rad()) / two).sin();
        let a = sin_d_lat * sin_d_lat
            + self.lat_rad().cos() * other.lat_rad().cos() * sin_d_lon * sin_d_lon;
        let c = two * a.sqrt().atan2((one - a).sqrt());

        Some(radius * c)
    }
}

/// Geo point that can be constructed from its coordinates.
pub trait NewGeoPoint<N = f64>: GeoPoint<Num = N> + Sized {
    /// Creates a point from latitude and longitude.
    fn latlon(lat: N, lon: N) -> Self;
    /// Creates a point from longitude and latitude (GeoJSON axis order).
    fn lonlat(lon: N, lat: N) -> Self {
        Self::latlon(lat, lon)
    }
}

/// 2d point on the surface of the Earth.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint for GeoPoint2d {
    type Num = f64;

    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl NewGeoPoint<f64> for GeoPoint2d {
    fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl GeoPoint2d {
    /// Creates a new point from another.
    pub fn from(other: &impl GeoPoint<Num = f64>) -> Self {
        Self {
            lat: other.lat(),
            lon: other.lon(),
        }
    }

    /// Returns true if both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Creates a new GeoPoint2d from latitude and longitude values (in degrees).
///
/// ```
/// use ductomap_types::geo::GeoPoint;
/// use ductomap_types::latlon;
///
/// let point = latlon!(4.5709, -74.2973);
/// assert_eq!(point.lat(), 4.5709);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        <$crate::geo::GeoPoint2d as $crate::geo::NewGeoPoint<f64>>::latlon($lat, $lon)
    };
}
