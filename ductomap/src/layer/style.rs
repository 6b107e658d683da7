use serde::{Deserialize, Serialize};

use crate::Color;

/// Drawing style of a thematic layer.
///
/// Missing values take the defaults web map libraries use for vector paths: blue `#3388FF` stroke,
/// weight 3, opaque, and a fill in the stroke color at 0.2 opacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub weight: f64,
    /// Stroke opacity, `0..=1`.
    pub opacity: f64,
    /// Fill color. Defaults to the stroke color.
    pub fill_color: Option<Color>,
    /// Fill opacity, `0..=1`.
    pub fill_opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Color::from_hex("#3388FF"),
            weight: 3.0,
            opacity: 1.0,
            fill_color: None,
            fill_opacity: 0.2,
        }
    }
}

impl Style {
    /// Stroke-only style.
    pub fn stroke(color: Color, weight: f64, opacity: f64) -> Self {
        Self {
            color,
            weight,
            opacity,
            ..Default::default()
        }
    }

    /// Returns a copy of the style with the given fill.
    pub fn with_fill(self, fill_color: Color, fill_opacity: f64) -> Self {
        Self {
            fill_color: Some(fill_color),
            fill_opacity,
            ..self
        }
    }

    /// Effective fill color.
    pub fn fill_color(&self) -> Color {
        self.fill_color.unwrap_or(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_style_uses_defaults() {
        let style: Style = serde_json::from_str(r##"{"color": "#FF0000"}"##).expect("valid style");
        assert_eq!(style.color, Color::RED);
        assert_eq!(style.weight, 3.0);
        assert_eq!(style.fill_color(), Color::RED);
    }
}
