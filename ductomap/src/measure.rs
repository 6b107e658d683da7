//! Interactive polyline distance measurement.
//!
//! While a measurement is active every click on the map adds a point. From the second point on the
//! path through all points is drawn and a callout with the segment length and the running total
//! stays at each new point. A right click or [`MeasurementSession::stop`] ends the measurement and
//! removes everything it drew.

use ductomap_types::geo::{Datum, GeoPoint, GeoPoint2d};
use log::debug;

use crate::control::{EventPropagation, MapEvent, MapEventHandler};
use crate::surface::{ItemId, MapSurface, SurfaceItem};
use crate::Color;

const PATH_WEIGHT: f64 = 3.0;

/// Great-circle distance between two points in kilometres, on a sphere with radius 6 371 km.
pub fn distance_km(from: &GeoPoint2d, to: &GeoPoint2d) -> f64 {
    from.distance(to, &Datum::EARTH_SPHERE).unwrap_or_default() / 1000.0
}

/// Callout text for a new point: segment length and running total with two decimals.
pub fn callout_text(segment_km: f64, total_km: f64) -> String {
    format!("{segment_km:.2} km\nTotal: {total_km:.2} km")
}

/// State of a [`MeasurementSession`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MeasurementState {
    /// Clicks are ignored.
    #[default]
    Idle,
    /// Clicks add points.
    Active,
}

/// Summary of a measurement for the UI readout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSnapshot {
    /// Whether the measurement accepts clicks.
    pub active: bool,
    /// Number of clicked points.
    pub point_count: usize,
    /// Total length in kilometres.
    pub total_km: f64,
    /// Length of the last segment in kilometres.
    pub last_segment_km: Option<f64>,
}

/// Click-accumulating distance measurement.
#[derive(Debug, Default)]
pub struct MeasurementSession {
    state: MeasurementState,
    points: Vec<GeoPoint2d>,
    total_km: f64,
    last_segment_km: Option<f64>,
    path: Option<ItemId>,
    callouts: Vec<ItemId>,
}

impl MeasurementSession {
    /// Creates an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> MeasurementState {
        self.state
    }

    /// Returns true while clicks add points.
    pub fn is_active(&self) -> bool {
        self.state == MeasurementState::Active
    }

    /// Clicked points in order.
    pub fn points(&self) -> &[GeoPoint2d] {
        &self.points
    }

    /// Sum of the segment lengths in kilometres.
    pub fn total_km(&self) -> f64 {
        self.total_km
    }

    /// Summary for the readout.
    pub fn snapshot(&self) -> MeasurementSnapshot {
        MeasurementSnapshot {
            active: self.is_active(),
            point_count: self.points.len(),
            total_km: self.total_km,
            last_segment_km: self.last_segment_km,
        }
    }

    /// Discards any previous measurement and starts accepting clicks.
    pub fn start(&mut self, surface: &mut dyn MapSurface) {
        self.clear(surface);
        self.state = MeasurementState::Active;
        debug!("Measurement started");
    }

    /// Stops accepting clicks and removes the path and callouts.
    pub fn stop(&mut self, surface: &mut dyn MapSurface) {
        self.state = MeasurementState::Idle;
        self.clear(surface);
        debug!("Measurement stopped");
    }

    /// Stops an active measurement or starts a new one. Returns true if the measurement is active
    /// afterwards.
    pub fn toggle(&mut self, surface: &mut dyn MapSurface) -> bool {
        if self.is_active() {
            self.stop(surface);
        } else {
            self.start(surface);
        }

        self.is_active()
    }

    /// Adds a point. Ignored unless the measurement is active. Returns true if the point was added.
    pub fn on_click(&mut self, point: GeoPoint2d, surface: &mut dyn MapSurface) -> bool {
        if !self.is_active() {
            return false;
        }

        self.points.push(point);
        let [.., previous, last] = self.points.as_slice() else {
            return true;
        };

        let segment_km = distance_km(previous, last);
        self.total_km += segment_km;
        self.last_segment_km = Some(segment_km);

        match self.path {
            Some(path) => surface.set_path_points(path, &self.points),
            None => {
                let path = ItemId::next();
                surface.add_item(
                    path,
                    &SurfaceItem::Path {
                        points: self.points.clone(),
                        color: Color::RED,
                        weight: PATH_WEIGHT,
                    },
                );
                self.path = Some(path);
            }
        }

        let callout = ItemId::next();
        surface.add_item(
            callout,
            &SurfaceItem::Callout {
                position: point,
                text: callout_text(segment_km, self.total_km),
            },
        );
        self.callouts.push(callout);

        true
    }

    fn clear(&mut self, surface: &mut dyn MapSurface) {
        if let Some(path) = self.path.take() {
            surface.remove_item(path);
        }

        for callout in self.callouts.drain(..) {
            surface.remove_item(callout);
        }

        self.points.clear();
        self.total_km = 0.0;
        self.last_segment_km = None;
    }
}

impl MapEventHandler for MeasurementSession {
    fn handle(&mut self, event: &MapEvent, surface: &mut dyn MapSurface) -> EventPropagation {
        if !self.is_active() {
            return EventPropagation::Propagate;
        }

        match event {
            MapEvent::Click(point) => {
                self.on_click(*point, surface);
                EventPropagation::Stop
            }
            MapEvent::ContextMenu(_) => {
                self.stop(surface);
                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }
}
