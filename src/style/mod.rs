//! # Style Configuration
//!
//! Page geometry, palette, and typography for the invoice layout.
//!
//! Every length here is in page units (millimetres, origin top-left);
//! font sizes are in points. `StyleConfig::default()` reproduces the
//! house style, and every field may be overridden from JSON.

use serde::{Deserialize, Serialize};

/// Points per page unit (millimetre).
pub const PT_PER_UNIT: f64 = 72.0 / 25.4;

/// Convert a length in points to page units.
pub fn pt_to_units(pt: f64) -> f64 {
    pt / PT_PER_UNIT
}

/// Convert a length in page units to points.
pub fn units_to_pt(units: f64) -> f64 {
    units * PT_PER_UNIT
}

/// An sRGB color stored as a byte triple, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);

    /// Components scaled to the 0.0 - 1.0 range PDF operators expect.
    pub fn unit_rgb(&self) -> (f64, f64, f64) {
        (
            self.0 as f64 / 255.0,
            self.1 as f64 / 255.0,
            self.2 as f64 / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Fixed page formats. Single page only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// (width, height) in page units.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }

    /// (width, height) in PDF points.
    pub fn dimensions_pt(&self) -> (f64, f64) {
        let (w, h) = self.dimensions();
        (units_to_pt(w), units_to_pt(h))
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "letter" => Some(PageSize::Letter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Palette {
    pub primary: Color,
    pub accent: Color,
    pub dark_gray: Color,
    pub medium_gray: Color,
    pub light_gray: Color,
    pub white: Color,
    /// Hairline under the line-item table.
    pub rule: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color(103, 101, 195),
            accent: Color(13, 148, 136),
            dark_gray: Color(17, 24, 39),
            medium_gray: Color(75, 85, 99),
            light_gray: Color(249, 250, 251),
            white: Color::WHITE,
            rule: Color(229, 231, 235),
        }
    }
}

/// Corner accent geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Decorative {
    /// Horizontal leg of each corner triangle.
    pub triangle_size: f64,
    /// Vertical leg of the top triangles; the bottom-right one uses twice this.
    pub corner_radius: f64,
}

impl Default for Decorative {
    fn default() -> Self {
        Self {
            triangle_size: 50.0,
            corner_radius: 40.0,
        }
    }
}

/// Font sizes in points, by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontSizes {
    /// Section headings ("BILL TO") and the "Total:" label.
    pub title: f64,
    /// Metadata labels, summary labels and values.
    pub label: f64,
    /// Bill-to lines and the signature caption.
    pub value: f64,
    /// Table header and body.
    pub table: f64,
    /// The grand total figure.
    pub total: f64,
    pub footer: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 11.0,
            label: 9.0,
            value: 10.0,
            table: 9.0,
            total: 12.0,
            footer: 8.0,
        }
    }
}

/// Complete styling input for a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    pub margin: f64,
    pub colors: Palette,
    pub decorative: Decorative,
    pub font_sizes: FontSizes,
    /// Vertical advance per wrapped line in the header and table.
    pub line_height: f64,
    /// Minimum height of a line-item row.
    pub min_row_height: f64,
    pub footer_text: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            margin: 27.0,
            colors: Palette::default(),
            decorative: Decorative::default(),
            font_sizes: FontSizes::default(),
            line_height: 5.0,
            min_row_height: 8.0,
            footer_text: "Hoopoe Studios".to_string(),
        }
    }
}

impl StyleConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_style_json_keeps_defaults() {
        let style = StyleConfig::from_json(r#"{ "margin": 20, "colors": { "accent": [1, 2, 3] } }"#)
            .unwrap();
        assert_eq!(style.margin, 20.0);
        assert_eq!(style.colors.accent, Color(1, 2, 3));
        assert_eq!(style.colors.primary, Palette::default().primary);
        assert_eq!(style.line_height, 5.0);
    }

    #[test]
    fn test_a4_in_points() {
        let (w, h) = PageSize::A4.dimensions_pt();
        assert!((w - 595.28).abs() < 0.01);
        assert!((h - 841.89).abs() < 0.01);
    }

    #[test]
    fn test_unit_roundtrip() {
        assert!((pt_to_units(units_to_pt(27.0)) - 27.0).abs() < 1e-9);
    }
}
