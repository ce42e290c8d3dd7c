//! Line-item table with wrapped descriptions and alternating row bands.

use super::{DrawCommand, LayoutEngine, TableLayout, TextAlign, TextStyle};
use crate::font::FontWeight;
use crate::model::{format_money, format_plain_number, LineItem};

const HEADER_BAR_HEIGHT: f64 = 10.0;
const HEADER_BASELINE: f64 = 6.5;
/// First row baseline, measured from the top of the header bar.
const FIRST_ROW_OFFSET: f64 = 16.0;
/// Row bands start this far above the row's first baseline.
const ROW_BAND_RISE: f64 = 4.0;
/// Horizontal space reserved right of the description column.
const NUMERIC_COLUMNS_WIDTH: f64 = 80.0;
const RULE_WIDTH: f64 = 0.1;

impl<'a> LayoutEngine<'a> {
    /// Lay out the header bar and one row per item, starting at `start_y`.
    ///
    /// Each row advances the cursor by `max(min_row_height, lines × line_height)`,
    /// where `lines` is the wrapped description's line count. Rate and
    /// amount are formatted as money in `currency`.
    pub fn layout_table(
        &self,
        items: &[LineItem],
        currency: &str,
        start_y: f64,
        page_width: f64,
    ) -> TableLayout {
        let style = self.style();
        let margin = style.margin;
        let table_width = page_width - 2.0 * margin;
        let right = page_width - margin;
        let mut commands = Vec::new();

        commands.push(DrawCommand::FillRect {
            x: margin,
            y: start_y,
            width: table_width,
            height: HEADER_BAR_HEIGHT,
            color: style.colors.primary,
        });

        let heading = TextStyle::new(style.font_sizes.table, FontWeight::Bold, style.colors.white);
        let header_y = start_y + HEADER_BASELINE;
        commands.push(heading.run(margin + 3.0, header_y, "DESCRIPTION", TextAlign::Start));
        commands.push(heading.run(right - 65.0, header_y, "QTY", TextAlign::Start));
        commands.push(heading.run(right - 45.0, header_y, "RATE", TextAlign::Start));
        commands.push(heading.run(right - 3.0, header_y, "AMOUNT", TextAlign::End));

        let body = TextStyle::new(style.font_sizes.table, FontWeight::Normal, style.colors.dark_gray);
        let amount_style = TextStyle::new(style.font_sizes.table, FontWeight::Bold, style.colors.dark_gray);
        let description_width = table_width - NUMERIC_COLUMNS_WIDTH;

        let mut cursor = start_y + FIRST_ROW_OFFSET;
        let mut row_cursors = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let lines = self.wrap(&item.description, description_width, body.size, body.weight);
            let row_height = style
                .min_row_height
                .max(lines.len() as f64 * style.line_height);

            if index % 2 == 0 {
                commands.push(DrawCommand::FillRect {
                    x: margin,
                    y: cursor - ROW_BAND_RISE,
                    width: table_width,
                    height: row_height,
                    color: style.colors.light_gray,
                });
            }

            for (i, line) in lines.iter().enumerate() {
                commands.push(body.run(
                    margin + 2.0,
                    cursor + i as f64 * style.line_height,
                    line.text.clone(),
                    TextAlign::Start,
                ));
            }

            commands.push(body.run(
                right - 70.0,
                cursor,
                format_plain_number(item.quantity),
                TextAlign::Start,
            ));
            commands.push(body.run(
                right - 50.0,
                cursor,
                format_money(currency, item.unit_rate),
                TextAlign::Start,
            ));
            commands.push(amount_style.run(
                right - 3.0,
                cursor,
                format_money(currency, item.amount()),
                TextAlign::End,
            ));

            log::debug!(
                "row {}: {} description line(s), height {:.1} at {:.1}",
                index,
                lines.len(),
                row_height,
                cursor
            );
            cursor += row_height;
            row_cursors.push(cursor);
        }

        commands.push(DrawCommand::Line {
            x1: margin,
            y1: cursor,
            x2: right,
            y2: cursor,
            color: style.colors.rule,
            line_width: RULE_WIDTH,
        });

        TableLayout {
            commands,
            end_y: cursor,
            row_cursors,
        }
    }
}
