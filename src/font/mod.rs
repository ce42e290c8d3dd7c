//! # Font Management
//!
//! The invoice uses the two standard Helvetica faces, which PDF viewers
//! provide without embedding. Text measurement goes through the
//! [`TextMeasure`] trait so layout never depends on where widths come from.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use serde::{Deserialize, Serialize};

/// Font weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// The standard PDF fonts this engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn for_weight(weight: FontWeight) -> Self {
        match weight {
            FontWeight::Normal => Self::Helvetica,
            FontWeight::Bold => Self::HelveticaBold,
        }
    }

    /// The PDF base font name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used inside content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "F0",
            Self::HelveticaBold => "F1",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }
}

/// The text-measurement primitive used by layout and rendering.
pub trait TextMeasure {
    /// Width of `text` on a single line, in points.
    fn text_width(&self, text: &str, font_size: f64, weight: FontWeight) -> f64;
}

/// Shared font context providing measurement from the standard metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, weight: FontWeight, font_size: f64) -> f64 {
        StandardFont::for_weight(weight)
            .metrics()
            .char_width(ch, font_size)
    }
}

impl TextMeasure for FontContext {
    fn text_width(&self, text: &str, font_size: f64, weight: FontWeight) -> f64 {
        StandardFont::for_weight(weight)
            .metrics()
            .measure_string(text, font_size, 0.0)
    }
}
