//! # Text Layout
//!
//! Greedy line breaking against a maximum width.
//!
//! Break opportunities come from UAX#14, so wrapping happens after spaces
//! and hyphens the way readers expect. A single word wider than the
//! column is split between characters rather than allowed to overflow.

use crate::font::{FontWeight, TextMeasure};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// The line content, trailing whitespace removed.
    pub text: String,
    /// Width of `text` in points.
    pub width: f64,
}

pub struct TextLayout<'a> {
    measure: &'a dyn TextMeasure,
}

impl<'a> TextLayout<'a> {
    pub fn new(measure: &'a dyn TextMeasure) -> Self {
        Self { measure }
    }

    fn width(&self, text: &str, font_size: f64, weight: FontWeight) -> f64 {
        self.measure.text_width(text, font_size, weight)
    }

    /// Break `text` into lines no wider than `max_width` points.
    ///
    /// Always returns at least one line; an empty input gives one empty line.
    /// `\n` and other mandatory breaks start a new line.
    pub fn break_into_lines(
        &self,
        text: &str,
        max_width: f64,
        font_size: f64,
        weight: FontWeight,
    ) -> Vec<BrokenLine> {
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
            self.break_paragraph(paragraph, max_width, font_size, weight, &mut lines);
        }

        if lines.is_empty() {
            lines.push(BrokenLine {
                text: String::new(),
                width: 0.0,
            });
        }
        lines
    }

    fn break_paragraph(
        &self,
        paragraph: &str,
        max_width: f64,
        font_size: f64,
        weight: FontWeight,
        lines: &mut Vec<BrokenLine>,
    ) {
        if paragraph.is_empty() {
            lines.push(BrokenLine {
                text: String::new(),
                width: 0.0,
            });
            return;
        }

        let mut current = String::new();
        let mut segment_start = 0;

        for (idx, opportunity) in linebreaks(paragraph) {
            let segment = &paragraph[segment_start..idx];
            segment_start = idx;

            let candidate = format!("{}{}", current, segment);
            let candidate_width = self.width(candidate.trim_end(), font_size, weight);

            if candidate_width <= max_width {
                current = candidate;
            } else {
                if !current.trim_end().is_empty() {
                    self.flush(&mut current, font_size, weight, lines);
                }
                current = self.split_overlong(segment, max_width, font_size, weight, lines);
            }

            if opportunity == BreakOpportunity::Mandatory && idx < paragraph.len() {
                self.flush(&mut current, font_size, weight, lines);
            }
        }

        if !current.is_empty() || lines.is_empty() {
            self.flush(&mut current, font_size, weight, lines);
        }
    }

    /// Emit full-width character chunks of a segment that is too wide on its
    /// own. Returns the trailing piece that still has room on its line.
    fn split_overlong(
        &self,
        segment: &str,
        max_width: f64,
        font_size: f64,
        weight: FontWeight,
        lines: &mut Vec<BrokenLine>,
    ) -> String {
        if self.width(segment.trim_end(), font_size, weight) <= max_width {
            return segment.to_string();
        }

        let mut chunk = String::new();
        for ch in segment.chars() {
            chunk.push(ch);
            let chunk_width = self.width(chunk.trim_end(), font_size, weight);
            if chunk_width > max_width && chunk.chars().count() > 1 {
                chunk.pop();
                self.flush(&mut chunk, font_size, weight, lines);
                chunk.push(ch);
            }
        }
        chunk
    }

    fn flush(
        &self,
        current: &mut String,
        font_size: f64,
        weight: FontWeight,
        lines: &mut Vec<BrokenLine>,
    ) {
        let text = current.trim_end().to_string();
        let width = self.width(&text, font_size, weight);
        lines.push(BrokenLine { text, width });
        current.clear();
    }
}
