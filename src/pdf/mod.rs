//! # PDF Serializer
//!
//! Applies a laid-out [`DrawCommand`] list to a single page and writes a
//! PDF 1.7 file.
//!
//! We write the raw bytes ourselves: the subset needed for an invoice
//! (filled paths, stroked lines, Type1 text, image XObjects) is small,
//! and owning the writer keeps the output byte-for-byte deterministic.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, images, content, page
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! ## Coordinates
//!
//! Commands arrive in page units (millimetres, origin top-left, Y down).
//! PDF user space is points with the origin bottom-left, so every Y is
//! flipped against the page height on the way out.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::assets::ImageAsset;
use crate::error::{InvoiceError, Result};
use crate::font::{FontContext, FontWeight, StandardFont, TextMeasure};
use crate::image_loader::{decode_asset, ImageError, ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawCommand, Point, TextAlign};
use crate::style::{units_to_pt, Color, PageSize};

/// Fonts registered on every page, in resource order (`/F0`, `/F1`).
const PAGE_FONTS: [StandardFont; 2] = [StandardFont::Helvetica, StandardFont::HelveticaBold];

/// Finished output of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub width_pt: f64,
    pub height_pt: f64,
}

impl RenderedDocument {
    /// Suggested download name: `invoice-{number}.pdf`.
    ///
    /// Characters that are unsafe in file names are replaced with `_`.
    pub fn file_name(invoice_number: &str) -> String {
        let safe: String = invoice_number
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("invoice-{}.pdf", safe)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Optional entries for the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
}

/// Single-page PDF writer.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    info: DocumentInfo,
    fonts: FontContext,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Object ids of `PAGE_FONTS`, same order.
    font_objects: Vec<usize>,
    /// XObject ids for images, referenced as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// Per command: the image slot it paints, if any.
    image_index_map: Vec<Option<usize>>,
}

struct PdfObject {
    data: Vec<u8>,
}

/// Lifecycle of one paint pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintPhase {
    Idle,
    Painting,
    Done,
}

/// The small amount of graphics state the painter keeps between commands.
///
/// Colors are only re-emitted when they change, so a run of same-colored
/// commands shares one `rg`.
struct Painter {
    phase: PaintPhase,
    page_height_pt: f64,
    stream: String,
    fill: Option<Color>,
    text_color: Option<Color>,
    stroke: Option<(Color, f64)>,
    weight: FontWeight,
}

impl Painter {
    fn new(page_height_pt: f64) -> Self {
        Self {
            phase: PaintPhase::Idle,
            page_height_pt,
            stream: String::new(),
            fill: None,
            text_color: None,
            stroke: None,
            weight: FontWeight::Normal,
        }
    }

    fn begin(&mut self) {
        debug_assert_eq!(self.phase, PaintPhase::Idle);
        self.phase = PaintPhase::Painting;
    }

    fn finish(&mut self) -> String {
        self.phase = PaintPhase::Done;
        std::mem::take(&mut self.stream)
    }

    fn x(&self, units: f64) -> f64 {
        units_to_pt(units)
    }

    fn y(&self, units: f64) -> f64 {
        self.page_height_pt - units_to_pt(units)
    }

    /// `rg` is shared by path fills and text, so switching between the two
    /// only costs an operator when the color actually differs.
    fn set_nonstroking(&mut self, color: Color) {
        let current = self.fill.or(self.text_color);
        if current != Some(color) {
            let (r, g, b) = color.unit_rgb();
            let _ = writeln!(self.stream, "{:.3} {:.3} {:.3} rg", r, g, b);
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.set_nonstroking(color);
        self.fill = Some(color);
        self.text_color = None;
        let (px, py) = (self.x(x), self.y(y + height));
        let _ = writeln!(
            self.stream,
            "{:.2} {:.2} {:.2} {:.2} re\nf",
            px,
            py,
            units_to_pt(width),
            units_to_pt(height)
        );
    }

    fn fill_triangle(&mut self, points: &[Point; 3], color: Color) {
        self.set_nonstroking(color);
        self.fill = Some(color);
        self.text_color = None;
        let [a, b, c] = points.map(|p| (self.x(p.x), self.y(p.y)));
        let _ = writeln!(
            self.stream,
            "{:.2} {:.2} m\n{:.2} {:.2} l\n{:.2} {:.2} l\nh\nf",
            a.0, a.1, b.0, b.1, c.0, c.1
        );
    }

    fn line(&mut self, from: Point, to: Point, color: Color, line_width: f64) {
        if self.stroke != Some((color, line_width)) {
            let (r, g, b) = color.unit_rgb();
            let _ = writeln!(self.stream, "{:.3} {:.3} {:.3} RG\n{:.2} w", r, g, b, line_width);
            self.stroke = Some((color, line_width));
        }
        let (x1, y1, x2, y2) = (self.x(from.x), self.y(from.y), self.x(to.x), self.y(to.y));
        let _ = writeln!(self.stream, "{:.2} {:.2} m\n{:.2} {:.2} l\nS", x1, y1, x2, y2);
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        fonts: &FontContext,
        x: f64,
        y: f64,
        content: &str,
        align: TextAlign,
        weight: FontWeight,
        font_size: f64,
        color: Color,
    ) {
        let previous_weight = self.weight;
        self.weight = weight;

        self.set_nonstroking(color);
        self.text_color = Some(color);
        self.fill = None;

        let glyphs = winansi_glyphs(content);
        let width = fonts.text_width(&glyphs, font_size, self.weight);
        let anchor = self.x(x);
        let left = match align {
            TextAlign::Start => anchor,
            TextAlign::End => anchor - width,
            TextAlign::Center => anchor - width / 2.0,
        };
        let baseline = self.y(y);
        let font = StandardFont::for_weight(self.weight);
        let _ = writeln!(
            self.stream,
            "BT\n/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET",
            font.resource_name(),
            font_size,
            left,
            baseline,
            encode_winansi(&glyphs)
        );

        self.weight = previous_weight;
    }

    fn image(&mut self, slot: usize, x: f64, y: f64, width: f64, height: f64) {
        let (px, py) = (self.x(x), self.y(y + height));
        let _ = writeln!(
            self.stream,
            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ",
            units_to_pt(width),
            units_to_pt(height),
            px,
            py,
            slot
        );
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.info.title = Some(title.into());
        self
    }

    /// Paint `commands` in order onto one page of `page_size`.
    ///
    /// Images that fail to decode are dropped with a warning. Non-finite
    /// geometry and images in an encoding the writer can't embed are
    /// errors; nothing is returned in that case.
    pub fn render(&self, commands: &[DrawCommand], page_size: PageSize) -> Result<RenderedDocument> {
        validate_geometry(commands)?;

        let (width_pt, height_pt) = page_size.dimensions_pt();
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: vec![None; commands.len()],
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, images, content stream, page
        for _ in 0..3 {
            builder.objects.push(PdfObject { data: vec![] });
        }

        self.register_fonts(&mut builder);
        self.register_images(&mut builder, commands)?;

        let content = self.build_content_stream(commands, &builder, height_pt);
        let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

        let content_obj_id = builder.objects.len();
        let mut content_data: Vec<u8> = Vec::new();
        let _ = write!(
            content_data,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed.len()
        );
        content_data.extend_from_slice(&compressed);
        content_data.extend_from_slice(b"\nendstream");
        builder.objects.push(PdfObject { data: content_data });

        let page_obj_id = builder.objects.len();
        let font_resources = self.build_font_resource_dict(&builder);
        let xobject_resources = self.build_xobject_resource_dict(&builder);
        let resources = if xobject_resources.is_empty() {
            format!("/Font << {} >>", font_resources)
        } else {
            format!("/Font << {} >> /XObject << {} >>", font_resources, xobject_resources)
        };
        let page_dict = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Contents {} 0 R /Resources << {} >> >>",
            width_pt, height_pt, content_obj_id, resources
        );
        builder.objects.push(PdfObject {
            data: page_dict.into_bytes(),
        });

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        builder.objects[2].data =
            format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", page_obj_id).into_bytes();

        let info_obj_id = self.write_info(&mut builder);
        let bytes = self.serialize(&builder, info_obj_id);

        log::info!(
            "rendered {} commands ({} images) into {} bytes",
            commands.len(),
            builder.image_objects.len(),
            bytes.len()
        );

        Ok(RenderedDocument {
            bytes,
            width_pt,
            height_pt,
        })
    }

    fn build_content_stream(&self, commands: &[DrawCommand], builder: &PdfBuilder, page_height_pt: f64) -> String {
        let mut painter = Painter::new(page_height_pt);
        painter.begin();

        for (index, command) in commands.iter().enumerate() {
            match command {
                DrawCommand::FillRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => painter.fill_rect(*x, *y, *width, *height, *color),
                DrawCommand::FillTriangle { points, color } => painter.fill_triangle(points, *color),
                DrawCommand::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                    line_width,
                } => painter.line(Point::new(*x1, *y1), Point::new(*x2, *y2), *color, *line_width),
                DrawCommand::Text {
                    x,
                    y,
                    content,
                    align,
                    weight,
                    font_size,
                    color,
                } => painter.text(&self.fonts, *x, *y, content, *align, *weight, *font_size, *color),
                DrawCommand::Image {
                    x,
                    y,
                    width,
                    height,
                    ..
                } => {
                    if let Some(slot) = builder.image_index_map[index] {
                        painter.image(slot, *x, *y, *width, *height);
                    }
                }
            }
        }

        painter.finish()
    }

    fn register_fonts(&self, builder: &mut PdfBuilder) {
        for font in PAGE_FONTS {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: font_dict.into_bytes(),
            });
            builder.font_objects.push(obj_id);
        }
    }

    /// Decode every image command up front and write its XObject.
    ///
    /// The same asset painted twice shares one XObject.
    fn register_images(&self, builder: &mut PdfBuilder, commands: &[DrawCommand]) -> Result<()> {
        let mut seen: Vec<(&ImageAsset, usize)> = Vec::new();

        for (index, command) in commands.iter().enumerate() {
            let DrawCommand::Image { asset, .. } = command else {
                continue;
            };

            if let Some(&(_, slot)) = seen.iter().find(|(a, _)| *a == asset) {
                builder.image_index_map[index] = Some(slot);
                continue;
            }

            match decode_asset(asset) {
                Ok(image) => {
                    let slot = builder.image_objects.len();
                    let xobj_id = Self::write_image_xobject(builder, &image);
                    builder.image_objects.push(xobj_id);
                    builder.image_index_map[index] = Some(slot);
                    seen.push((asset, slot));
                }
                Err(ImageError::Corrupt(message)) => {
                    log::warn!("dropping image ({}): {}", asset.mime_type, message);
                }
                Err(e @ ImageError::Unsupported(_)) => {
                    return Err(InvoiceError::Render(e.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };

                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space_str,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let smask_obj_id = builder.objects.len();
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed_alpha.len()
                    );
                    smask_data.extend_from_slice(&compressed_alpha);
                    smask_data.extend_from_slice(b"\nendstream");
                    builder.objects.push(PdfObject { data: smask_data });
                    smask_obj_id
                });

                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let obj_id = builder.objects.len();
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();

                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed_rgb.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed_rgb);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }
        }
    }

    fn build_font_resource_dict(&self, builder: &PdfBuilder) -> String {
        PAGE_FONTS
            .iter()
            .zip(&builder.font_objects)
            .map(|(font, obj_id)| format!("/{} {} 0 R", font.resource_name(), obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn build_xobject_resource_dict(&self, builder: &PdfBuilder) -> String {
        builder
            .image_objects
            .iter()
            .enumerate()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn write_info(&self, builder: &mut PdfBuilder) -> Option<usize> {
        let title = self.info.title.as_ref()?;
        let id = builder.objects.len();
        let mut info = String::from("<< ");
        let _ = write!(info, "/Title ({}) ", encode_winansi(title));
        info.push_str("/Producer (Invoice Forge) >>");
        builder.objects.push(PdfObject {
            data: info.into_bytes(),
        });
        Some(id)
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", builder.objects.len());
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}

/// Reject commands whose geometry can't be written as PDF numbers.
fn validate_geometry(commands: &[DrawCommand]) -> Result<()> {
    for (index, command) in commands.iter().enumerate() {
        let finite = match command {
            DrawCommand::FillRect {
                x, y, width, height, ..
            }
            | DrawCommand::Image {
                x, y, width, height, ..
            } => [*x, *y, *width, *height].iter().all(|v| v.is_finite()),
            DrawCommand::FillTriangle { points, .. } => {
                points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            }
            DrawCommand::Text { x, y, font_size, .. } => {
                x.is_finite() && y.is_finite() && font_size.is_finite()
            }
            DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                line_width,
                ..
            } => [*x1, *y1, *x2, *y2, *line_width].iter().all(|v| v.is_finite()),
        };
        if !finite {
            return Err(InvoiceError::Render(format!(
                "non-finite geometry in {} command #{}",
                command.kind(),
                index
            )));
        }
    }
    Ok(())
}

/// The text as it will be shown: characters outside WinAnsi become `?`.
fn winansi_glyphs(s: &str) -> String {
    s.chars()
        .map(|ch| if unicode_to_winansi(ch).is_some() { ch } else { '?' })
        .collect()
}

/// Encode text as a WinAnsi literal string body, escaping delimiters.
///
/// Characters outside WinAnsi become `?`.
fn encode_winansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// contains special mappings for smart quotes, bullets, dashes, etc.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}
