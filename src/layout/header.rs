//! Header block: logo, "Bill To" column, invoice metadata column.

use super::{DrawCommand, HeaderLayout, LayoutEngine, TextAlign, TextStyle};
use crate::font::FontWeight;
use crate::model::InvoiceDocument;

const LOGO_TOP: f64 = 36.0;
const LOGO_WIDTH: f64 = 50.0;
const LOGO_HEIGHT: f64 = 30.0;

/// Baseline of the "BILL TO" heading.
const BILL_TO_TOP: f64 = 70.0;
/// Gap between the heading and the client name.
const BILL_TO_HEADING_GAP: f64 = 7.0;
const ADDRESS_WRAP_WIDTH: f64 = 80.0;

/// Baseline of the first metadata row.
const META_TOP: f64 = 50.0;
const META_ROW_STEP: f64 = 6.0;
/// Distance from the right margin to the metadata labels.
const META_LABEL_INSET: f64 = 50.0;

/// Space between the lower header column and the table.
const HEADER_GAP: f64 = 15.0;

impl<'a> LayoutEngine<'a> {
    /// Lay out the header. `bottom_y` is where the table begins.
    pub fn layout_header(&self, document: &InvoiceDocument, page_width: f64) -> HeaderLayout {
        let style = self.style();
        let margin = style.margin;
        let line_height = style.line_height;
        let mut commands = Vec::new();

        if let Some(logo) = &document.logo_image {
            commands.push(DrawCommand::Image {
                x: margin,
                y: LOGO_TOP,
                width: LOGO_WIDTH,
                height: LOGO_HEIGHT,
                asset: logo.clone(),
            });
        }

        // Left column
        let heading = TextStyle::new(style.font_sizes.title, FontWeight::Bold, style.colors.medium_gray);
        let value = TextStyle::new(style.font_sizes.value, FontWeight::Normal, style.colors.dark_gray);

        let mut left_y = BILL_TO_TOP;
        commands.push(heading.run(margin, left_y, "BILL TO", TextAlign::Start));

        left_y += BILL_TO_HEADING_GAP;
        commands.push(value.run(margin, left_y, document.client.name.clone(), TextAlign::Start));

        left_y += line_height;
        commands.push(value.run(margin, left_y, document.client.email.clone(), TextAlign::Start));

        if let Some(company) = &document.client.company {
            left_y += line_height;
            commands.push(value.run(margin, left_y, company.clone(), TextAlign::Start));
        }

        if let Some(address) = &document.client.address {
            left_y += line_height;
            let lines = self.wrap(address, ADDRESS_WRAP_WIDTH, value.size, value.weight);
            for (i, line) in lines.iter().enumerate() {
                commands.push(value.run(
                    margin,
                    left_y + i as f64 * line_height,
                    line.text.clone(),
                    TextAlign::Start,
                ));
            }
            left_y += (lines.len() - 1) as f64 * line_height;
        }

        // Right column
        let label = TextStyle::new(style.font_sizes.label, FontWeight::Bold, style.colors.medium_gray);
        let meta = TextStyle::new(style.font_sizes.label, FontWeight::Normal, style.colors.dark_gray);
        let label_x = page_width - margin - META_LABEL_INSET;
        let value_x = page_width - margin;

        let rows = [
            ("Invoice Number:", &document.invoice.number),
            ("Date:", &document.invoice.issue_date),
            ("Due Date:", &document.invoice.due_date),
        ];
        let mut right_y = META_TOP;
        for (i, (caption, text)) in rows.iter().enumerate() {
            if i > 0 {
                right_y += META_ROW_STEP;
            }
            commands.push(label.run(label_x, right_y, *caption, TextAlign::Start));
            commands.push(meta.run(value_x, right_y, text.as_str(), TextAlign::End));
        }

        let bottom_y = left_y.max(right_y) + HEADER_GAP;
        log::debug!(
            "header: left column ends {:.1}, right column ends {:.1}, table at {:.1}",
            left_y,
            right_y,
            bottom_y
        );

        HeaderLayout { commands, bottom_y }
    }
}
