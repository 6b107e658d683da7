//! Pointer coordinate readout in decimal degrees or degrees-minutes-seconds.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ductomap_types::geo::{GeoPoint, GeoPoint2d};
use serde::{Deserialize, Serialize};

use crate::control::{EventPropagation, MapEvent, MapEventHandler};
use crate::surface::MapSurface;

/// How coordinates are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateFormat {
    /// Signed decimal degrees: `-74.297300°`.
    Decimal,
    /// Degrees, minutes and seconds with hemisphere: `74°17'50.28"W`.
    #[default]
    Dms,
}

impl FromStr for CoordinateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decimal" => Ok(Self::Decimal),
            "dms" => Ok(Self::Dms),
            other => Err(format!("unknown coordinate format {other:?}")),
        }
    }
}

impl Display for CoordinateFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decimal => f.write_str("decimal"),
            Self::Dms => f.write_str("dms"),
        }
    }
}

/// Which coordinate of a point is formatted. Decides the hemisphere letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// North/south.
    Latitude,
    /// East/west.
    Longitude,
}

/// Writes the value as signed decimal degrees with six decimals.
pub fn format_decimal(value: f64) -> String {
    format!("{value:.6}°")
}

/// Writes the value as `D°MM'SS.ss"H`.
pub fn format_dms(value: f64, axis: Axis) -> String {
    let absolute = value.abs();
    let degrees = absolute.floor();
    let minutes_full = (absolute - degrees) * 60.0;
    let minutes = minutes_full.floor();
    let seconds = (minutes_full - minutes) * 60.0;

    let hemisphere = match (axis, value >= 0.0) {
        (Axis::Latitude, true) => 'N',
        (Axis::Latitude, false) => 'S',
        (Axis::Longitude, true) => 'E',
        (Axis::Longitude, false) => 'W',
    };

    format!(
        "{}°{:02}'{:05.2}\"{hemisphere}",
        degrees as u32, minutes as u32, seconds
    )
}

/// Writes the value in the given format.
pub fn format_coordinate(value: f64, axis: Axis, format: CoordinateFormat) -> String {
    match format {
        CoordinateFormat::Decimal => format_decimal(value),
        CoordinateFormat::Dms => format_dms(value, axis),
    }
}

/// Formatted latitude and longitude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateReadout {
    /// Formatted latitude.
    pub latitude: String,
    /// Formatted longitude.
    pub longitude: String,
}

impl CoordinateReadout {
    fn new(position: &GeoPoint2d, format: CoordinateFormat) -> Self {
        Self {
            latitude: format_coordinate(position.lat(), Axis::Latitude, format),
            longitude: format_coordinate(position.lon(), Axis::Longitude, format),
        }
    }
}

/// Coordinate readout that follows the pointer.
///
/// Shows the pointer position while the pointer is over the map and the map centre after it leaves.
#[derive(Debug, Clone)]
pub struct CoordinateDisplay {
    format: CoordinateFormat,
    position: GeoPoint2d,
    readout: CoordinateReadout,
}

impl CoordinateDisplay {
    /// Creates a readout showing `position`.
    pub fn new(format: CoordinateFormat, position: GeoPoint2d) -> Self {
        Self {
            format,
            position,
            readout: CoordinateReadout::new(&position, format),
        }
    }

    /// Current format.
    pub fn format(&self) -> CoordinateFormat {
        self.format
    }

    /// Position the readout shows.
    pub fn position(&self) -> GeoPoint2d {
        self.position
    }

    /// Current text.
    pub fn readout(&self) -> &CoordinateReadout {
        &self.readout
    }

    /// Moves the readout to `position`.
    pub fn update(&mut self, position: GeoPoint2d) -> &CoordinateReadout {
        self.position = position;
        self.readout = CoordinateReadout::new(&position, self.format);
        &self.readout
    }

    /// Changes the format and shows `center` in it.
    pub fn set_format(&mut self, format: CoordinateFormat, center: GeoPoint2d) -> &CoordinateReadout {
        self.format = format;
        self.update(center)
    }
}

impl MapEventHandler for CoordinateDisplay {
    fn handle(&mut self, event: &MapEvent, surface: &mut dyn MapSurface) -> EventPropagation {
        match event {
            MapEvent::PointerMoved(position) => {
                self.update(*position);
            }
            MapEvent::PointerLeft => {
                self.update(surface.center());
            }
            _ => {}
        }

        EventPropagation::Propagate
    }
}
