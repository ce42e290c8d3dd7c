//! # Invoice Forge
//!
//! A single-page invoice layout engine and PDF emitter.
//!
//! An invoice is a fixed form, not a flowing document: one page, a header
//! in two columns, a line-item table, a totals block, a signature. The only
//! dynamic part is the table. Descriptions wrap, and each row pushes the
//! rest of the page down by exactly its own height, so nothing overlaps no
//! matter how long a description gets.
//!
//! Layout and painting are separate passes. Layout measures text and emits
//! a flat list of positioned draw commands; the PDF writer applies them in
//! order. The command list is plain data, so the same numbers that reach
//! the PDF can be inspected, tested, or shown in a preview.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON / InvoiceDraft)
//!       ↓
//!   [model]    InvoiceDocument snapshot, coerced numbers, totals
//!       ↓
//!   [layout]   header → table → summary → signature, in page units
//!       ↓      (measures text via [font] + [text])
//!   [pdf]      paint DrawCommands, serialize PDF bytes
//!       ↓
//!   [store]    optional: upload bytes, save the invoice record
//! ```

pub mod assets;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod numbering;
pub mod pdf;
pub mod store;
pub mod style;
pub mod text;

pub use error::{InvoiceError, Result};
pub use model::draft::InvoiceDraft;
pub use model::{InvoiceDocument, LineItem, Totals};
pub use pdf::RenderedDocument;
pub use style::{PageSize, StyleConfig};

use font::FontContext;
use layout::{InvoiceLayout, LayoutEngine};
use pdf::PdfWriter;

/// Compute the page layout without painting it.
pub fn layout_invoice(document: &InvoiceDocument, style: &StyleConfig, page_size: PageSize) -> InvoiceLayout {
    let font_context = FontContext::new();
    let engine = LayoutEngine::new(&font_context, style);
    engine.layout(document, page_size)
}

/// Render an invoice to PDF bytes.
///
/// This is the primary entry point. Missing or undecodable images are
/// left out of the page; anything else that prevents a complete PDF is an
/// error.
pub fn render_invoice(document: &InvoiceDocument, style: &StyleConfig, page_size: PageSize) -> Result<RenderedDocument> {
    let layout = layout_invoice(document, style, page_size);
    PdfWriter::new()
        .with_title(format!("Invoice {}", document.invoice.number))
        .render(&layout.commands, page_size)
}

/// Render an invoice described as JSON.
pub fn render_json(json: &str, style: &StyleConfig, page_size: PageSize) -> Result<RenderedDocument> {
    let document = InvoiceDocument::from_json(json)?;
    render_invoice(&document, style, page_size)
}
