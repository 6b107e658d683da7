use std::sync::Arc;

use crate::config::LayerConfig;
use crate::layer::{Feature, FeatureRef, LayerId, ThematicLayer};

/// Storage of all thematic layers of a viewer, in their declared order.
///
/// Every configured layer has an entry from the start. Its features arrive when its GeoJSON
/// document has been loaded, and each load replaces only that layer's features.
#[derive(Debug, Default)]
pub struct GeometryStore {
    layers: Vec<ThematicLayer>,
}

impl GeometryStore {
    /// Creates a store with an empty layer for every config.
    pub fn new(configs: impl IntoIterator<Item = Arc<LayerConfig>>) -> Self {
        Self {
            layers: configs.into_iter().map(ThematicLayer::new).collect(),
        }
    }

    /// Layer with the given id.
    pub fn layer(&self, id: &LayerId) -> Option<&ThematicLayer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }

    /// All layers in declared order.
    pub fn layers(&self) -> impl Iterator<Item = &ThematicLayer> + '_ {
        self.layers.iter()
    }

    /// Number of features of the layer. Unknown layers have none.
    pub fn feature_count(&self, id: &LayerId) -> usize {
        self.layer(id).map(ThematicLayer::len).unwrap_or(0)
    }

    /// Feature the reference points to. A reference taken before the last reload or clear of its
    /// layer resolves to `None`.
    pub fn feature(&self, feature_ref: &FeatureRef) -> Option<&Feature> {
        let layer = self.layer(&feature_ref.layer)?;
        if layer.generation() != feature_ref.generation {
            return None;
        }

        layer.feature(feature_ref.index)
    }

    /// Replaces all features of the layer. Returns false if the layer is not known.
    pub fn replace(&mut self, id: &LayerId, features: Vec<Feature>) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.replace_features(features);
                true
            }
            None => false,
        }
    }

    /// Discards all features of the layer. Calling it again has no further effect.
    pub fn clear(&mut self, id: &LayerId) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.clear();
                true
            }
            None => false,
        }
    }

    fn layer_mut(&mut self, id: &LayerId) -> Option<&mut ThematicLayer> {
        self.layers.iter_mut().find(|layer| layer.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::layer::Properties;
    use ductomap_types::{latlon, Geom};

    fn store() -> GeometryStore {
        GeometryStore::new(ViewerConfig::corridor().layers.into_iter().map(Arc::new))
    }

    fn point_feature() -> Feature {
        Feature::new(Geom::Point(latlon!(4.5, -74.2)), Properties::default())
    }

    #[test]
    fn layers_start_empty_in_declared_order() {
        let store = store();
        let ids: Vec<_> = store.layers().map(|l| l.id().as_str().to_string()).collect();
        assert_eq!(
            ids,
            ["postes", "ducto_c1", "ducto_c2", "ducto_c3", "ducto_c4", "veredas"]
        );
        assert!(store.layers().all(|l| l.is_empty()));
    }

    #[test]
    fn replace_touches_only_one_layer() {
        let mut store = store();
        assert!(store.replace(&"postes".into(), vec![point_feature(), point_feature()]));
        assert!(store.replace(&"veredas".into(), vec![point_feature()]));
        assert!(store.replace(&"postes".into(), vec![point_feature()]));

        assert_eq!(store.feature_count(&"postes".into()), 1);
        assert_eq!(store.feature_count(&"veredas".into()), 1);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut store = store();
        store.replace(&"postes".into(), vec![point_feature()]);
        assert!(store.clear(&"postes".into()));
        assert!(store.clear(&"postes".into()));
        assert_eq!(store.feature_count(&"postes".into()), 0);
        assert!(!store.clear(&"unknown".into()));
    }

    #[test]
    fn reference_does_not_survive_reload() {
        let mut store = store();
        store.replace(&"postes".into(), vec![point_feature()]);
        let layer = store.layer(&"postes".into()).expect("configured layer");
        let feature_ref = FeatureRef {
            layer: "postes".into(),
            index: 0,
            generation: layer.generation(),
        };
        assert!(store.feature(&feature_ref).is_some());

        store.replace(&"postes".into(), vec![point_feature()]);
        assert!(store.feature(&feature_ref).is_none());

        let fresh = FeatureRef {
            generation: store.layer(&"postes".into()).expect("configured layer").generation(),
            ..feature_ref
        };
        assert!(store.feature(&fresh).is_some());
    }
}
