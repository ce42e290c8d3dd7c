//! Subtotal, tax and highlighted total rows.

use super::{DrawCommand, LayoutEngine, SummaryLayout, TextAlign, TextStyle};
use crate::font::FontWeight;
use crate::model::{format_money, format_plain_number, Totals};

const SUMMARY_GAP: f64 = 10.0;
/// Distance from the right margin to the summary labels.
const LABEL_INSET: f64 = 60.0;
const VALUE_INSET: f64 = 3.0;
const TAX_STEP: f64 = 6.0;
const TOTAL_STEP: f64 = 8.0;
const HIGHLIGHT_PAD: f64 = 5.0;
const HIGHLIGHT_RISE: f64 = 6.0;
const HIGHLIGHT_WIDTH: f64 = 65.0;
const HIGHLIGHT_HEIGHT: f64 = 10.0;

impl<'a> LayoutEngine<'a> {
    pub fn layout_summary(
        &self,
        totals: &Totals,
        tax_rate_percent: f64,
        currency: &str,
        start_y: f64,
        page_width: f64,
    ) -> SummaryLayout {
        let style = self.style();
        let label_x = page_width - style.margin - LABEL_INSET;
        let value_x = page_width - style.margin - VALUE_INSET;
        let mut commands = Vec::new();

        let label = TextStyle::new(style.font_sizes.label, FontWeight::Bold, style.colors.medium_gray);
        let value = TextStyle::new(style.font_sizes.label, FontWeight::Normal, style.colors.dark_gray);

        let mut y = start_y + SUMMARY_GAP;
        commands.push(label.run(label_x, y, "Subtotal:", TextAlign::Start));
        commands.push(value.run(value_x, y, format_money(currency, totals.subtotal), TextAlign::End));

        y += TAX_STEP;
        commands.push(label.run(
            label_x,
            y,
            format!("Tax ({}%):", format_plain_number(tax_rate_percent)),
            TextAlign::Start,
        ));
        commands.push(value.run(value_x, y, format_money(currency, totals.tax), TextAlign::End));

        y += TOTAL_STEP;
        commands.push(DrawCommand::FillRect {
            x: label_x - HIGHLIGHT_PAD,
            y: y - HIGHLIGHT_RISE,
            width: HIGHLIGHT_WIDTH,
            height: HIGHLIGHT_HEIGHT,
            color: style.colors.accent,
        });
        let total_label = TextStyle::new(style.font_sizes.title, FontWeight::Bold, style.colors.white);
        let total_value = TextStyle::new(style.font_sizes.total, FontWeight::Bold, style.colors.white);
        commands.push(total_label.run(label_x, y, "Total:", TextAlign::Start));
        commands.push(total_value.run(value_x, y, format_money(currency, totals.total), TextAlign::End));

        SummaryLayout { commands, end_y: y }
    }
}
