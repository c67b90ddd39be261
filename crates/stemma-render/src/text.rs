use serde::{Deserialize, Serialize};
use stemma_core::StemmaConfig;

/// Labels share one font family (set once on the SVG root), so only the size varies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { font_size: 14.0 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Fixed-advance measurer: every char is `font_size * char_width_factor` wide.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = style.font_size.max(1.0);
        TextMetrics {
            width: text.chars().count() as f64 * font_size * char_width_factor,
            height: font_size * line_height_factor,
        }
    }
}

/// Box geometry for a node label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeBoxMetrics {
    pub min_width: f64,
    pub label_padding: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub font_size: f64,
}

impl Default for NodeBoxMetrics {
    fn default() -> Self {
        Self {
            min_width: 120.0,
            label_padding: 26.0,
            height: 32.0,
            corner_radius: 8.0,
            font_size: 14.0,
        }
    }
}

impl NodeBoxMetrics {
    pub fn from_config(config: &StemmaConfig) -> Self {
        let d = Self::default();
        Self {
            min_width: config.positive_f64("node.minWidth", d.min_width),
            label_padding: config.get_f64("node.labelPadding").unwrap_or(d.label_padding).max(0.0),
            height: config.positive_f64("node.height", d.height),
            corner_radius: config.get_f64("node.cornerRadius").unwrap_or(d.corner_radius).max(0.0),
            font_size: config.positive_f64("node.fontSize", d.font_size),
        }
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font_size: self.font_size,
        }
    }

    /// `max(minWidth, measured label width + padding)`.
    pub fn box_width(&self, measurer: &dyn TextMeasurer, label: &str) -> f64 {
        let metrics = measurer.measure(label, &self.text_style());
        self.min_width.max(metrics.width + self.label_padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_use_min_width() {
        let m = NodeBoxMetrics::default();
        assert_eq!(m.box_width(&DeterministicTextMeasurer::default(), "Seth"), 120.0);
    }

    #[test]
    fn long_labels_grow_with_text() {
        let m = NodeBoxMetrics::default();
        let label = "Methuselah son of Enoch";
        let w = m.box_width(&DeterministicTextMeasurer::default(), label);
        let expected = label.chars().count() as f64 * 14.0 * 0.6 + 26.0;
        assert!((w - expected).abs() < 1e-9);
        assert!(w > 120.0);
    }
}
