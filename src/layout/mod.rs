//! # Layout Engine
//!
//! Turns an [`InvoiceDocument`] and a [`StyleConfig`] into an ordered list
//! of [`DrawCommand`]s in page units (millimetres, origin top-left).
//!
//! The page is built top to bottom in one pass. A single vertical cursor
//! flows from the header into the line-item table, the summary, and the
//! signature block. It only ever moves down: every row advances it by the
//! row's full height, so wrapped descriptions push later rows down instead
//! of overlapping them.
//!
//! Commands are appended in paint order (background fills before the text
//! drawn over them) so the renderer can apply them as-is.

mod frame;
mod header;
mod summary;
mod table;

use serde::Serialize;

use crate::assets::ImageAsset;
use crate::font::{FontWeight, TextMeasure};
use crate::model::{InvoiceDocument, Totals};
use crate::style::{pt_to_units, units_to_pt, Color, PageSize, StyleConfig};
use crate::text::{BrokenLine, TextLayout};

pub use frame::compute_decorative_frame;

/// A point in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Horizontal anchoring of a text run relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextAlign {
    /// `x` is the left edge.
    #[default]
    Start,
    /// `x` is the right edge.
    End,
    /// `x` is the horizontal center.
    Center,
}

/// One primitive paint operation in page coordinates.
///
/// Text `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DrawCommand {
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    FillTriangle {
        points: [Point; 3],
        color: Color,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        align: TextAlign,
        weight: FontWeight,
        font_size: f64,
        color: Color,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(skip)]
        asset: ImageAsset,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        /// Stroke width in points.
        line_width: f64,
    },
}

impl DrawCommand {
    /// Text content, if this is a text command.
    pub fn text_content(&self) -> Option<&str> {
        match self {
            DrawCommand::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::FillRect { .. } => "FillRect",
            DrawCommand::FillTriangle { .. } => "FillTriangle",
            DrawCommand::Text { .. } => "Text",
            DrawCommand::Image { .. } => "Image",
            DrawCommand::Line { .. } => "Line",
        }
    }
}

/// Font size, weight and color shared by a group of text runs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextStyle {
    pub size: f64,
    pub weight: FontWeight,
    pub color: Color,
}

impl TextStyle {
    pub fn new(size: f64, weight: FontWeight, color: Color) -> Self {
        Self {
            size,
            weight,
            color,
        }
    }

    pub fn run(&self, x: f64, y: f64, content: impl Into<String>, align: TextAlign) -> DrawCommand {
        DrawCommand::Text {
            x,
            y,
            content: content.into(),
            align,
            weight: self.weight,
            font_size: self.size,
            color: self.color,
        }
    }
}

/// Result of laying out the header block.
#[derive(Debug, Clone)]
pub struct HeaderLayout {
    pub commands: Vec<DrawCommand>,
    /// Where the table starts: the lower of the two columns plus a gap.
    pub bottom_y: f64,
}

/// Result of laying out the line-item table.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub commands: Vec<DrawCommand>,
    /// Cursor position of the closing rule.
    pub end_y: f64,
    /// Cursor position after each line item, in input order.
    pub row_cursors: Vec<f64>,
}

/// Result of laying out the totals block.
#[derive(Debug, Clone)]
pub struct SummaryLayout {
    pub commands: Vec<DrawCommand>,
    /// Baseline of the total row.
    pub end_y: f64,
}

/// A complete page: commands in paint order plus the totals they show.
#[derive(Debug, Clone)]
pub struct InvoiceLayout {
    pub page_size: PageSize,
    pub commands: Vec<DrawCommand>,
    pub totals: Totals,
    pub table_start_y: f64,
    pub table_end_y: f64,
    /// Bottom of the signature block.
    pub signature_bottom_y: f64,
    /// Top of the footer text.
    pub footer_top_y: f64,
}

impl InvoiceLayout {
    /// Whether the signature block runs into the footer.
    pub fn overflows(&self) -> bool {
        self.signature_bottom_y > self.footer_top_y
    }
}

/// Computes invoice geometry. Holds no mutable state; one engine can lay
/// out any number of invoices.
pub struct LayoutEngine<'a> {
    measure: &'a dyn TextMeasure,
    style: &'a StyleConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(measure: &'a dyn TextMeasure, style: &'a StyleConfig) -> Self {
        Self { measure, style }
    }

    pub fn style(&self) -> &StyleConfig {
        self.style
    }

    /// Lay out the whole page.
    pub fn layout(&self, document: &InvoiceDocument, page_size: PageSize) -> InvoiceLayout {
        let (page_width, page_height) = page_size.dimensions();
        let totals = document.totals();
        let mut commands = Vec::new();

        commands.push(DrawCommand::FillRect {
            x: 0.0,
            y: 0.0,
            width: page_width,
            height: page_height,
            color: self.style.colors.white,
        });
        commands.extend(compute_decorative_frame(page_size, self.style));

        let header = self.layout_header(document, page_width);
        commands.extend(header.commands);

        let table = self.layout_table(
            &document.line_items,
            &document.currency_symbol,
            header.bottom_y,
            page_width,
        );
        commands.extend(table.commands);

        let summary = self.layout_summary(
            &totals,
            document.tax_rate_percent,
            &document.currency_symbol,
            table.end_y,
            page_width,
        );
        commands.extend(summary.commands);

        commands.extend(self.layout_signature_and_footer(
            summary.end_y,
            page_width,
            page_height,
            document.signature_image.as_ref(),
        ));

        let signature_bottom_y = frame::signature_block_bottom(summary.end_y);
        let footer_top_y = self.footer_top(page_height);
        if signature_bottom_y > footer_top_y {
            log::warn!(
                "invoice {} overflows the page: signature ends at {:.1}, footer starts at {:.1}",
                document.invoice.number,
                signature_bottom_y,
                footer_top_y
            );
        }
        log::debug!(
            "laid out invoice {}: {} commands, table {:.1}..{:.1}",
            document.invoice.number,
            commands.len(),
            header.bottom_y,
            table.end_y
        );

        InvoiceLayout {
            page_size,
            commands,
            totals,
            table_start_y: header.bottom_y,
            table_end_y: table.end_y,
            signature_bottom_y,
            footer_top_y,
        }
    }

    /// Wrap `text` to `max_width` page units.
    pub(crate) fn wrap(&self, text: &str, max_width: f64, font_size: f64, weight: FontWeight) -> Vec<BrokenLine> {
        TextLayout::new(self.measure).break_into_lines(text, units_to_pt(max_width), font_size, weight)
    }

    /// Width of a single-line run in page units.
    pub fn text_width(&self, text: &str, font_size: f64, weight: FontWeight) -> f64 {
        pt_to_units(self.measure.text_width(text, font_size, weight))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::font::FontContext;
    use crate::model::{ClientInfo, InvoiceDetails, LineItem};

    pub(crate) fn sample_document(items: Vec<LineItem>) -> InvoiceDocument {
        InvoiceDocument {
            client: ClientInfo {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                company: None,
                address: None,
            },
            invoice: InvoiceDetails {
                number: "HOP-75300-001".to_string(),
                issue_date: "2026-03-01".to_string(),
                due_date: "2026-03-31".to_string(),
            },
            currency_symbol: "$".to_string(),
            tax_rate_percent: 10.0,
            line_items: items,
            signature_image: None,
            logo_image: None,
        }
    }

    pub(crate) fn texts(commands: &[DrawCommand]) -> Vec<&str> {
        commands.iter().filter_map(DrawCommand::text_content).collect()
    }

    #[test]
    fn test_layout_is_idempotent() {
        let fc = FontContext::new();
        let style = StyleConfig::default();
        let engine = LayoutEngine::new(&fc, &style);
        let doc = sample_document(vec![
            LineItem::new("Design", 2.0, 50.0),
            LineItem::new("A much longer description that will certainly wrap onto a second line of the table", 1.0, 12.5),
        ]);

        let a = engine.layout(&doc, PageSize::A4);
        let b = engine.layout(&doc, PageSize::A4);
        assert_eq!(a.commands, b.commands);
    }

    #[test]
    fn test_paint_order_background_first() {
        let fc = FontContext::new();
        let style = StyleConfig::default();
        let engine = LayoutEngine::new(&fc, &style);
        let layout = engine.layout(&sample_document(vec![LineItem::new("Design", 2.0, 50.0)]), PageSize::A4);

        match &layout.commands[0] {
            DrawCommand::FillRect { width, height, color, .. } => {
                assert_eq!((*width, *height), PageSize::A4.dimensions());
                assert_eq!(*color, Color::WHITE);
            }
            other => panic!("expected page background, got {:?}", other),
        }
        let triangles = layout.commands[1..4]
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillTriangle { .. }))
            .count();
        assert_eq!(triangles, 3);
    }

    #[test]
    fn test_scenario_a_summary_strings() {
        let fc = FontContext::new();
        let style = StyleConfig::default();
        let engine = LayoutEngine::new(&fc, &style);
        let layout = engine.layout(&sample_document(vec![LineItem::new("Design", 2.0, 50.0)]), PageSize::A4);

        assert_eq!(layout.totals.subtotal, 100.0);
        assert_eq!(layout.totals.tax, 10.0);
        assert_eq!(layout.totals.total, 110.0);

        let all = texts(&layout.commands);
        for expected in ["$ 100.00", "$ 10.00", "$ 110.00", "Tax (10%):"] {
            assert!(all.contains(&expected), "missing {:?} in {:?}", expected, all);
        }
    }

    #[test]
    fn test_letter_page_mirrors_right_column() {
        let fc = FontContext::new();
        let style = StyleConfig::default();
        let engine = LayoutEngine::new(&fc, &style);
        let layout = engine.layout(&sample_document(vec![LineItem::new("Design", 1.0, 1.0)]), PageSize::Letter);

        let number = layout
            .commands
            .iter()
            .find(|c| c.text_content() == Some("HOP-75300-001"))
            .unwrap();
        match number {
            DrawCommand::Text { x, align, .. } => {
                assert!((x - (215.9 - 27.0)).abs() < 1e-9);
                assert_eq!(*align, TextAlign::End);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_overflow_is_measured_against_the_footer() {
        let fc = FontContext::new();
        let style = StyleConfig::default();
        let engine = LayoutEngine::new(&fc, &style);
        let rows = |n: usize| sample_document(vec![LineItem::new("Design", 1.0, 1.0); n]);

        // 11 rows: table ends at 201, total row at 225, signature block at 273.
        let fits = engine.layout(&rows(11), PageSize::A4);
        assert!((fits.signature_bottom_y - 273.0).abs() < 1e-9);
        assert!((fits.footer_top_y - (282.0 - 8.0 * 25.4 / 72.0)).abs() < 1e-9);
        assert!(!fits.overflows());

        // One more row pushes the signature into the footer while the
        // totals are still well inside the page.
        let crowded = engine.layout(&rows(12), PageSize::A4);
        assert!(crowded.overflows());
        assert!(crowded.signature_bottom_y < 297.0);
    }
}
