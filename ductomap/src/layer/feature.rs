use std::fmt::{Display, Formatter};

use ductomap_types::error::GeometryError;
use ductomap_types::Geom;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::layer::LayerId;

/// Scalar value of a feature property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    String(String),
}

impl PropertyValue {
    /// Returns true for `null` and for strings that are empty or contain only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            PropertyValue::Null => true,
            PropertyValue::String(s) => s.trim().is_empty(),
            PropertyValue::Bool(_) | PropertyValue::Number(_) => false,
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Null => f.write_str("null"),
            PropertyValue::Bool(v) => write!(f, "{v}"),
            PropertyValue::Number(v) => write_number(f, *v),
            PropertyValue::String(v) => f.write_str(v),
        }
    }
}

/// Writes a number the way a browser converts it to a string: integers without a fractional part,
/// and exponent notation with an explicit sign below `1e-6` and from `1e21` on.
fn write_number(f: &mut Formatter<'_>, v: f64) -> std::fmt::Result {
    let magnitude = v.abs();
    if v == 0.0 {
        return f.write_str("0");
    }
    if v.is_infinite() {
        return f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if magnitude.is_finite() && (magnitude >= 1e21 || magnitude < 1e-6) {
        let formatted = format!("{v:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                write!(f, "{mantissa}e+{exponent}")
            }
            _ => f.write_str(&formatted),
        };
    }
    if v.fract() == 0.0 && magnitude < 1e15 {
        return write!(f, "{}", v as i64);
    }

    write!(f, "{v}")
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PropertyValue::Null,
            Value::Bool(v) => PropertyValue::Bool(v),
            Value::Number(v) => v
                .as_f64()
                .map(PropertyValue::Number)
                .unwrap_or_else(|| PropertyValue::String(v.to_string())),
            Value::String(v) => PropertyValue::String(v),
            nested @ (Value::Array(_) | Value::Object(_)) => {
                PropertyValue::String(nested.to_string())
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

/// Ordered mapping of property names to scalar values.
///
/// Iteration order is the order of the keys in the source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties(Vec<(String, PropertyValue)>);

impl Properties {
    /// Value of the property `name`.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Iterates over the properties in their native order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> + '_ {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut properties = Properties::default();
        for (key, value) in iter {
            let key = key.into();
            let value = value.into();
            match properties.0.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => properties.0.push((key, value)),
            }
        }

        properties
    }
}

impl From<serde_json::Map<String, Value>> for Properties {
    fn from(value: serde_json::Map<String, Value>) -> Self {
        value.into_iter().collect()
    }
}

/// A geographic object of a thematic layer: geometry and properties.
///
/// Features are immutable once loaded. A feature whose geometry is missing or malformed is kept
/// (its properties are still searchable) but it is never drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    geometry: Result<Geom, GeometryError>,
    properties: Properties,
}

impl Feature {
    /// Creates a feature with valid geometry.
    pub fn new(geometry: Geom, properties: Properties) -> Self {
        Self {
            geometry: Ok(geometry),
            properties,
        }
    }

    /// Creates a feature whose geometry could not be read.
    pub fn without_geometry(error: GeometryError, properties: Properties) -> Self {
        Self {
            geometry: Err(error),
            properties,
        }
    }

    /// Geometry of the feature, if it is valid.
    pub fn geometry(&self) -> Option<&Geom> {
        self.geometry.as_ref().ok()
    }

    /// Geometry of the feature or the reason it is not available.
    pub fn try_geometry(&self) -> Result<&Geom, &GeometryError> {
        self.geometry.as_ref()
    }

    /// Feature properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Reference to a feature: the owning layer and the index of the feature in load order.
///
/// The reference is only valid for the [generation](crate::layer::ThematicLayer::generation) of the
/// layer it was taken from. After the layer is reloaded or cleared it resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureRef {
    /// Owning layer.
    pub layer: LayerId,
    /// Position of the feature in the layer.
    pub index: usize,
    /// Generation of the layer when the reference was taken.
    pub generation: u64,
}
