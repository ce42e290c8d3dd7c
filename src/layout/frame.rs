//! Page furniture: corner triangles, signature block, footer.

use super::{DrawCommand, LayoutEngine, Point, TextAlign, TextStyle};
use crate::assets::ImageAsset;
use crate::font::FontWeight;
use crate::style::{pt_to_units, PageSize, StyleConfig};

/// Gap between the summary's total row and the signature caption.
const SIGNATURE_GAP: f64 = 30.0;
const SIGNATURE_IMAGE_OFFSET: f64 = 3.0;
const SIGNATURE_IMAGE_WIDTH: f64 = 30.0;
const SIGNATURE_IMAGE_HEIGHT: f64 = 15.0;
/// Footer baseline, measured up from the bottom edge.
const FOOTER_INSET: f64 = 15.0;

/// The three corner triangles, in the primary color.
///
/// Top-left and top-right have legs `triangle_size` across and
/// `corner_radius` down. The bottom-right one is twice as tall.
pub fn compute_decorative_frame(page_size: PageSize, style: &StyleConfig) -> Vec<DrawCommand> {
    let (w, h) = page_size.dimensions();
    let t = style.decorative.triangle_size;
    let c = style.decorative.corner_radius;
    let color = style.colors.primary;

    vec![
        DrawCommand::FillTriangle {
            points: [Point::new(0.0, 0.0), Point::new(0.0, c), Point::new(t, 0.0)],
            color,
        },
        DrawCommand::FillTriangle {
            points: [Point::new(w - t, 0.0), Point::new(w, 0.0), Point::new(w, c)],
            color,
        },
        DrawCommand::FillTriangle {
            points: [
                Point::new(w, h - 2.0 * c),
                Point::new(w, h),
                Point::new(w - t, h),
            ],
            color,
        },
    ]
}

/// Bottom of the space reserved for the signature, image or not.
pub(crate) fn signature_block_bottom(start_y: f64) -> f64 {
    start_y + SIGNATURE_GAP + SIGNATURE_IMAGE_OFFSET + SIGNATURE_IMAGE_HEIGHT
}

impl<'a> LayoutEngine<'a> {
    /// Top of the footer line's glyphs.
    pub(crate) fn footer_top(&self, page_height: f64) -> f64 {
        page_height - FOOTER_INSET - pt_to_units(self.style().font_sizes.footer)
    }

    /// Signature caption (and image, when present) below the summary, plus
    /// the centered footer line.
    pub fn layout_signature_and_footer(
        &self,
        start_y: f64,
        page_width: f64,
        page_height: f64,
        signature: Option<&ImageAsset>,
    ) -> Vec<DrawCommand> {
        let style = self.style();
        let margin = style.margin;
        let y = start_y + SIGNATURE_GAP;
        let mut commands = Vec::new();

        let caption = TextStyle::new(style.font_sizes.value, FontWeight::Bold, style.colors.medium_gray);
        commands.push(caption.run(margin, y, "Authorized Signature:", TextAlign::Start));

        if let Some(asset) = signature {
            commands.push(DrawCommand::Image {
                x: margin,
                y: y + SIGNATURE_IMAGE_OFFSET,
                width: SIGNATURE_IMAGE_WIDTH,
                height: SIGNATURE_IMAGE_HEIGHT,
                asset: asset.clone(),
            });
        }

        let footer = TextStyle::new(style.font_sizes.footer, FontWeight::Normal, style.colors.medium_gray);
        commands.push(footer.run(
            page_width / 2.0,
            page_height - FOOTER_INSET,
            style.footer_text.clone(),
            TextAlign::Center,
        ));

        commands
    }
}
