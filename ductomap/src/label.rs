//! Text labels of features, collected in three groups that are shown and hidden as a whole.
//!
//! A label is created for a feature when its layer has a label field and the feature has a non-blank
//! value for it. Labels of point layers, polyline layers and polygon layers go to separate
//! [`LabelGroup`]s. Group visibility is a flag checked for every label, so a label added while
//! its group is shown appears immediately and one added while its group is hidden appears when the
//! group is shown.

use ductomap_types::geo::GeoPoint2d;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::LabelConfig;
use crate::layer::{Feature, GeometryKind, LayerId, ThematicLayer};
use crate::surface::{ItemId, MapSurface, SurfaceItem};
use crate::Color;

const LABEL_BOX_SIZE: [u32; 2] = [100, 20];

/// Group a label belongs to, by the geometry kind of its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelGroup {
    /// Labels of point layers.
    Point,
    /// Labels of polyline layers.
    Polyline,
    /// Labels of polygon layers.
    Polygon,
}

impl LabelGroup {
    /// All groups.
    pub const ALL: [LabelGroup; 3] = [LabelGroup::Point, LabelGroup::Polyline, LabelGroup::Polygon];

    /// Group of labels of a layer with the given kind.
    pub fn for_kind(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Point => Self::Point,
            GeometryKind::Polyline => Self::Polyline,
            GeometryKind::Polygon => Self::Polygon,
        }
    }

    /// Text color of the group's labels.
    pub fn color(&self) -> Color {
        match self {
            Self::Polygon => Color::from_hex("#000307"),
            Self::Polyline | Self::Point => Color::RED,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Point => 0,
            Self::Polyline => 1,
            Self::Polygon => 2,
        }
    }
}

/// Label of one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEntry {
    /// Label text.
    pub text: String,
    /// Label position: the point of a point feature, the bounds centre of anything else.
    pub anchor: GeoPoint2d,
    /// Group of the label.
    pub group: LabelGroup,
    /// Layer of the labelled feature.
    pub layer: LayerId,
}

impl LabelEntry {
    fn surface_item(&self) -> SurfaceItem {
        SurfaceItem::Label {
            position: self.anchor,
            text: self.text.clone(),
            color: self.group.color(),
            box_size: LABEL_BOX_SIZE,
        }
    }
}

#[derive(Debug, Default)]
struct GroupState {
    visible: bool,
    entries: Vec<(ItemId, LabelEntry)>,
}

/// Holds the labels of all layers and puts the labels of visible groups on the map.
#[derive(Debug, Default)]
pub struct LabelAnnotator {
    groups: [GroupState; 3],
}

impl LabelAnnotator {
    /// Creates an annotator with the given initial group visibility.
    pub fn new(config: LabelConfig) -> Self {
        let mut annotator = Self::default();
        annotator.groups[LabelGroup::Point.index()].visible = config.point;
        annotator.groups[LabelGroup::Polyline.index()].visible = config.polyline;
        annotator.groups[LabelGroup::Polygon.index()].visible = config.polygon;
        annotator
    }

    /// Label of the feature, if its layer has a label field and the feature has a non-blank value
    /// for it. `0` and `false` are valid label texts.
    pub fn maybe_create_label(feature: &Feature, layer: &ThematicLayer) -> Option<LabelEntry> {
        let field = layer.label_field()?;
        let value = feature.properties().get(field)?;
        if value.is_blank() {
            return None;
        }

        let anchor = feature.geometry()?.anchor()?;

        Some(LabelEntry {
            text: value.to_string(),
            anchor,
            group: LabelGroup::for_kind(layer.kind()),
            layer: layer.id().clone(),
        })
    }

    /// Adds the label to its group and puts it on the map if the group is visible.
    pub fn add(&mut self, entry: LabelEntry, surface: &mut dyn MapSurface) -> ItemId {
        let id = ItemId::next();
        let group = &mut self.groups[entry.group.index()];
        if group.visible {
            surface.add_item(id, &entry.surface_item());
        }

        group.entries.push((id, entry));
        id
    }

    /// Shows or hides all labels of the group. Returns true if the visibility changed.
    pub fn set_group_visible(
        &mut self,
        group: LabelGroup,
        visible: bool,
        surface: &mut dyn MapSurface,
    ) -> bool {
        let state = &mut self.groups[group.index()];
        if state.visible == visible {
            return false;
        }

        state.visible = visible;
        for (id, entry) in &state.entries {
            if visible {
                surface.add_item(*id, &entry.surface_item());
            } else {
                surface.remove_item(*id);
            }
        }

        debug!(
            "Label group {group:?} is now {}",
            if visible { "visible" } else { "hidden" }
        );
        true
    }

    /// Returns true if the group is visible.
    pub fn is_group_visible(&self, group: LabelGroup) -> bool {
        self.groups[group.index()].visible
    }

    /// Labels of the group in the order they were added.
    pub fn entries(&self, group: LabelGroup) -> impl Iterator<Item = &LabelEntry> + '_ {
        self.groups[group.index()]
            .entries
            .iter()
            .map(|(_, entry)| entry)
    }

    /// Removes all labels of the layer.
    pub fn clear_layer(&mut self, layer: &LayerId, surface: &mut dyn MapSurface) {
        for group in &mut self.groups {
            let visible = group.visible;
            group.entries.retain(|(id, entry)| {
                if &entry.layer != layer {
                    return true;
                }

                if visible {
                    surface.remove_item(*id);
                }
                false
            });
        }
    }
}
