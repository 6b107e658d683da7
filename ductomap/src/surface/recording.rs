use std::sync::Arc;

use ductomap_types::geo::{GeoPoint2d, GeoRect};
use parking_lot::Mutex;

use super::{FitOptions, IconSpec, ItemId, MapSurface, SurfaceItem};

/// Call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    /// [`MapSurface::add_item`]
    Add(ItemId),
    /// [`MapSurface::remove_item`]
    Remove(ItemId),
    /// [`MapSurface::set_marker_icon`]
    SetMarkerIcon(ItemId, IconSpec),
    /// [`MapSurface::set_path_points`]
    SetPathPoints(ItemId, usize),
    /// [`MapSurface::open_popup`]
    OpenPopup(ItemId),
    /// [`MapSurface::fit_bounds`]
    FitBounds(GeoRect, FitOptions),
    /// [`MapSurface::set_view`]
    SetView(GeoPoint2d, f64),
}

#[derive(Debug)]
struct State {
    items: Vec<(ItemId, SurfaceItem)>,
    calls: Vec<SurfaceCall>,
    center: GeoPoint2d,
    zoom: f64,
}

/// In-memory [`MapSurface`] that keeps the items currently on the map and a log of every call.
///
/// Clones share the same state, so a test can hand one clone to the viewer and inspect another.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    state: Arc<Mutex<State>>,
}

impl RecordingSurface {
    /// Creates an empty surface with the given view.
    pub fn new(center: GeoPoint2d, zoom: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                items: Vec::new(),
                calls: Vec::new(),
                center,
                zoom,
            })),
        }
    }

    /// Items on the map in the order they were added.
    pub fn items(&self) -> Vec<(ItemId, SurfaceItem)> {
        self.state.lock().items.clone()
    }

    /// The item with the given id, if it is on the map.
    pub fn item(&self, id: ItemId) -> Option<SurfaceItem> {
        self.state
            .lock()
            .items
            .iter()
            .find(|(item_id, _)| *item_id == id)
            .map(|(_, item)| item.clone())
    }

    /// Returns true if the item is on the map.
    pub fn contains(&self, id: ItemId) -> bool {
        self.item(id).is_some()
    }

    /// Number of items on the map matching the predicate.
    pub fn count(&self, predicate: impl Fn(&SurfaceItem) -> bool) -> usize {
        self.state
            .lock()
            .items
            .iter()
            .filter(|(_, item)| predicate(item))
            .count()
    }

    /// All calls so far.
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.lock().calls.clone()
    }

    /// Returns all calls so far and forgets them.
    pub fn take_calls(&self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.state.lock().calls)
    }

    /// Changes the zoom the way a user gesture would, without recording a call.
    pub fn set_zoom(&self, zoom: f64) {
        self.state.lock().zoom = zoom;
    }
}

impl MapSurface for RecordingSurface {
    fn add_item(&mut self, id: ItemId, item: &SurfaceItem) {
        let mut state = self.state.lock();
        match state.items.iter().position(|(item_id, _)| *item_id == id) {
            Some(index) => state.items[index].1 = item.clone(),
            None => state.items.push((id, item.clone())),
        }
        state.calls.push(SurfaceCall::Add(id));
    }

    fn remove_item(&mut self, id: ItemId) {
        let mut state = self.state.lock();
        state.items.retain(|(item_id, _)| *item_id != id);
        state.calls.push(SurfaceCall::Remove(id));
    }

    fn set_marker_icon(&mut self, id: ItemId, icon: &IconSpec) {
        let mut state = self.state.lock();
        if let Some((_, SurfaceItem::Marker { icon: current, .. })) =
            state.items.iter_mut().find(|(item_id, _)| *item_id == id)
        {
            *current = *icon;
        }
        state.calls.push(SurfaceCall::SetMarkerIcon(id, *icon));
    }

    fn set_path_points(&mut self, id: ItemId, points: &[GeoPoint2d]) {
        let mut state = self.state.lock();
        if let Some((_, SurfaceItem::Path { points: current, .. })) =
            state.items.iter_mut().find(|(item_id, _)| *item_id == id)
        {
            *current = points.to_vec();
        }
        state.calls.push(SurfaceCall::SetPathPoints(id, points.len()));
    }

    fn open_popup(&mut self, id: ItemId) {
        self.state.lock().calls.push(SurfaceCall::OpenPopup(id));
    }

    fn fit_bounds(&mut self, bounds: &GeoRect, options: FitOptions) {
        let mut state = self.state.lock();
        state.center = bounds.center();
        state.zoom = options.max_zoom;
        state.calls.push(SurfaceCall::FitBounds(*bounds, options));
    }

    fn set_view(&mut self, center: GeoPoint2d, zoom: f64) {
        let mut state = self.state.lock();
        state.center = center;
        state.zoom = zoom;
        state.calls.push(SurfaceCall::SetView(center, zoom));
    }

    fn zoom(&self) -> f64 {
        self.state.lock().zoom
    }

    fn center(&self) -> GeoPoint2d {
        self.state.lock().center
    }
}
