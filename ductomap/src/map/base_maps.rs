use log::info;

use crate::config::BaseMapConfig;
use crate::error::ViewerError;
use crate::layer::attribution::Attribution;
use crate::surface::{ItemId, MapSurface, SurfaceItem};

/// The configured base maps, of which at most one is on the map.
#[derive(Debug, Clone, Default)]
pub struct BaseMapCollection {
    base_maps: Vec<BaseMapConfig>,
    active: Option<(usize, ItemId)>,
}

impl BaseMapCollection {
    /// Creates a collection with no active base map.
    pub fn new(base_maps: Vec<BaseMapConfig>) -> Self {
        Self {
            base_maps,
            active: None,
        }
    }

    /// All configured base maps.
    pub fn iter(&self) -> impl Iterator<Item = &BaseMapConfig> + '_ {
        self.base_maps.iter()
    }

    /// Number of configured base maps.
    pub fn len(&self) -> usize {
        self.base_maps.len()
    }

    /// Returns true if no base maps are configured.
    pub fn is_empty(&self) -> bool {
        self.base_maps.is_empty()
    }

    /// The base map on the map.
    pub fn active(&self) -> Option<&BaseMapConfig> {
        self.active.map(|(index, _)| &self.base_maps[index])
    }

    /// Attribution of the active base map.
    pub fn attribution(&self) -> Option<&Attribution> {
        self.active().map(|base_map| &base_map.attribution)
    }

    /// Replaces the active base map with the one with the given id. Returns false if it was already
    /// active.
    pub fn activate(&mut self, id: &str, surface: &mut dyn MapSurface) -> Result<bool, ViewerError> {
        let index = self
            .base_maps
            .iter()
            .position(|base_map| base_map.id == id)
            .ok_or_else(|| ViewerError::UnknownBaseMap(id.to_string()))?;

        if let Some((active, item)) = self.active {
            if active == index {
                return Ok(false);
            }

            surface.remove_item(item);
        }

        let base_map = &self.base_maps[index];
        let item = ItemId::next();
        surface.add_item(
            item,
            &SurfaceItem::TileLayer {
                url_template: base_map.url_template.clone(),
                attribution: base_map.attribution.clone(),
            },
        );
        self.active = Some((index, item));
        info!("Base map {} activated", base_map.name);

        Ok(true)
    }
}
