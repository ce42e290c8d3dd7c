//! Integration tests for the invoice pipeline.
//!
//! These tests exercise the full path from JSON or a draft to PDF bytes.
//! They verify:
//! - JSON deserialization and numeric coercion
//! - Header, table and summary geometry on the finished page
//! - Missing, corrupt and unsupported images
//! - PDF output is structurally valid
//! - Publishing with allocated invoice numbers

use std::sync::Arc;

use invoice_forge::assets::{load_optional, FsAssets, ImageAsset, InMemoryAssets};
use invoice_forge::layout::{DrawCommand, TextAlign};
use invoice_forge::model::draft::{LineItemEdit, ValidationErrors};
use invoice_forge::numbering::InvoiceNumberAllocator;
use invoice_forge::store::{
    publish_invoice, BlobStore, DocumentStore, InMemoryBlobStore, InMemoryCounterStore, InMemoryDocumentStore,
};
use invoice_forge::*;

// ─── Helpers ────────────────────────────────────────────────────

const MINIMAL_INVOICE: &str = r#"{
  "client": { "name": "Ada Lovelace", "email": "ada@example.com" },
  "invoice": { "number": "HOP-75300-001", "issueDate": "2026-03-01", "dueDate": "2026-03-31" },
  "currencySymbol": "$",
  "taxRatePercent": 10,
  "lineItems": [ { "description": "Design", "quantity": 2, "unitRate": 50 } ]
}"#;

fn minimal_document() -> InvoiceDocument {
    InvoiceDocument::from_json(MINIMAL_INVOICE).unwrap()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn contains(bytes: &[u8], needle: &[u8]) -> bool {
    bytes.windows(needle.len()).any(|w| w == needle)
}

fn texts(commands: &[DrawCommand]) -> Vec<&str> {
    commands.iter().filter_map(DrawCommand::text_content).collect()
}

fn images(commands: &[DrawCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Image { .. }))
        .count()
}

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 2, image::Rgba(rgba));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 2, image::ColorType::Rgba8).unwrap();
    buf
}

// ─── Scenarios ──────────────────────────────────────────────────

#[test]
fn test_single_item_totals_and_strings() {
    let layout = layout_invoice(&minimal_document(), &StyleConfig::default(), PageSize::A4);

    assert_eq!(layout.totals.subtotal, 100.0);
    assert_eq!(layout.totals.tax, 10.0);
    assert_eq!(layout.totals.total, 110.0);

    let all = texts(&layout.commands);
    for expected in ["$ 100.00", "$ 10.00", "$ 110.00", "Tax (10%):", "Hoopoe Studios"] {
        assert!(all.contains(&expected), "missing {:?}", expected);
    }
}

#[test]
fn test_minimal_header_starts_table_at_97() {
    let layout = layout_invoice(&minimal_document(), &StyleConfig::default(), PageSize::A4);
    assert_eq!(layout.table_start_y, 97.0);

    let header_bar = layout.commands.iter().find(|c| {
        matches!(c, DrawCommand::FillRect { y, height, .. } if *y == 97.0 && *height == 10.0)
    });
    assert!(header_bar.is_some());
}

#[test]
fn test_long_description_wraps_to_three_lines() {
    let mut doc = minimal_document();
    doc.line_items[0].description = vec!["invoice"; 18].join(" ");
    doc.line_items.push(LineItem::new("Follow-up", 1.0, 10.0));

    let layout = layout_invoice(&doc, &StyleConfig::default(), PageSize::A4);

    // First row: baseline 113, three lines at 5 apart, advance 15.
    let follow_up = layout
        .commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::Text { y, content, .. } if content == "Follow-up" => Some(*y),
            _ => None,
        })
        .unwrap();
    assert_eq!(follow_up, 128.0);
    assert_eq!(layout.table_end_y, 136.0);
}

#[test]
fn test_rows_never_overlap() {
    let mut doc = minimal_document();
    doc.line_items = (0..6)
        .map(|i| LineItem::new("Consulting hours for the quarterly review ".repeat(i + 1), 1.5, 80.0))
        .collect();

    let layout = layout_invoice(&doc, &StyleConfig::default(), PageSize::A4);
    let amounts: Vec<f64> = layout
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text {
                y,
                align: TextAlign::End,
                content,
                ..
            } if content == "$ 120.00" => Some(*y),
            _ => None,
        })
        .collect();

    assert_eq!(amounts.len(), 6);
    for pair in amounts.windows(2) {
        assert!(pair[1] >= pair[0] + 8.0, "rows overlap: {:?}", amounts);
    }
}

#[test]
fn test_layout_is_idempotent() {
    let doc = minimal_document();
    let style = StyleConfig::default();
    let a = layout_invoice(&doc, &style, PageSize::Letter);
    let b = layout_invoice(&doc, &style, PageSize::Letter);
    assert_eq!(a.commands, b.commands);
}

// ─── Rendering ──────────────────────────────────────────────────

#[test]
fn test_render_json_produces_valid_pdf() {
    let rendered = render_json(MINIMAL_INVOICE, &StyleConfig::default(), PageSize::A4).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert!(contains(&rendered.bytes, b"/Title (Invoice HOP-75300-001)"));
}

#[test]
fn test_render_is_deterministic() {
    let doc = minimal_document();
    let style = StyleConfig::default();
    let a = render_invoice(&doc, &style, PageSize::A4).unwrap();
    let b = render_invoice(&doc, &style, PageSize::A4).unwrap();
    assert_eq!(a.bytes, b.bytes);
}

#[test]
fn test_letter_page_size() {
    let rendered = render_invoice(&minimal_document(), &StyleConfig::default(), PageSize::Letter).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert!((rendered.width_pt - 612.0).abs() < 0.01);
    assert!((rendered.height_pt - 792.0).abs() < 0.01);
    assert!(contains(&rendered.bytes, b"/MediaBox [0 0 612.00 792.00]"));
}

#[test]
fn test_garbage_numbers_render_as_zero() {
    let json = r#"{
      "client": { "name": "Ada", "email": "ada@example.com" },
      "invoice": { "number": "X-1", "issueDate": "2026-01-01", "dueDate": "2026-01-31" },
      "taxRatePercent": "abc",
      "lineItems": [ { "description": "Mystery", "quantity": "lots", "rate": "NaN" } ]
    }"#;
    let doc = InvoiceDocument::from_json(json).unwrap();
    let layout = layout_invoice(&doc, &StyleConfig::default(), PageSize::A4);
    assert_eq!(layout.totals.total, 0.0);
    assert!(texts(&layout.commands).contains(&"Tax (0%):"));
    assert_valid_pdf(&render_invoice(&doc, &StyleConfig::default(), PageSize::A4).unwrap().bytes);
}

#[test]
fn test_parse_error_has_hint() {
    let err = render_json("{ \"client\": ", &StyleConfig::default(), PageSize::A4).unwrap_err();
    assert!(matches!(err, InvoiceError::Parse { .. }));
    assert!(err.to_string().contains("Hint"));
}

#[test]
fn test_custom_style_and_currency() {
    let style = StyleConfig::from_json(r#"{ "footerText": "Acme Ltd", "margin": 20 }"#).unwrap();
    let mut doc = minimal_document();
    doc.currency_symbol = "€".to_string();

    let layout = layout_invoice(&doc, &style, PageSize::A4);
    let all = texts(&layout.commands);
    assert!(all.contains(&"Acme Ltd"));
    assert!(all.contains(&"€ 110.00"));

    let rendered = render_invoice(&doc, &style, PageSize::A4).unwrap();
    assert_valid_pdf(&rendered.bytes);
}

// ─── Images ─────────────────────────────────────────────────────

#[test]
fn test_missing_assets_are_omitted() {
    let assets = InMemoryAssets::new();
    let mut doc = minimal_document();
    doc.logo_image = load_optional(&assets, "logo.png");
    doc.signature_image = load_optional(&assets, "signature.png");

    let layout = layout_invoice(&doc, &StyleConfig::default(), PageSize::A4);
    assert_eq!(images(&layout.commands), 0);
    assert!(texts(&layout.commands).contains(&"Authorized Signature:"));
    assert_valid_pdf(&render_invoice(&doc, &StyleConfig::default(), PageSize::A4).unwrap().bytes);
}

#[test]
fn test_logo_and_signature_from_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("logo.png"), png([103, 101, 195, 255])).unwrap();
    std::fs::write(dir.path().join("signature.png"), png([0, 0, 0, 80])).unwrap();

    let assets = FsAssets::new(dir.path());
    let mut doc = minimal_document();
    doc.logo_image = load_optional(&assets, "logo.png");
    doc.signature_image = load_optional(&assets, "signature.png");

    let layout = layout_invoice(&doc, &StyleConfig::default(), PageSize::A4);
    assert_eq!(images(&layout.commands), 2);

    let rendered = render_invoice(&doc, &StyleConfig::default(), PageSize::A4).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert!(contains(&rendered.bytes, b"/Im0"));
    assert!(contains(&rendered.bytes, b"/Im1"));
    // Only the translucent signature needs a soft mask.
    assert_eq!(rendered.bytes.windows(6).filter(|w| w == b"/SMask").count(), 1);
}

#[test]
fn test_data_uri_logo_in_json() {
    let logo = ImageAsset::new(png([13, 148, 136, 255]), "image/png");
    let mut value: serde_json::Value = serde_json::from_str(MINIMAL_INVOICE).unwrap();
    value["logoImage"] = serde_json::Value::String(logo.to_data_uri());

    let doc: InvoiceDocument = serde_json::from_value(value).unwrap();
    assert_eq!(doc.logo_image.as_ref(), Some(&logo));
    let rendered = render_invoice(&doc, &StyleConfig::default(), PageSize::A4).unwrap();
    assert!(contains(&rendered.bytes, b"/Subtype /Image"));
}

#[test]
fn test_undecodable_inline_image_is_omitted() {
    let mut value: serde_json::Value = serde_json::from_str(MINIMAL_INVOICE).unwrap();
    value["signatureImage"] = serde_json::Value::String("data:image/png;base64,@@not-base64@@".to_string());

    let rendered = render_json(&value.to_string(), &StyleConfig::default(), PageSize::A4).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert!(!contains(&rendered.bytes, b"/Subtype /Image"));
}

#[test]
fn test_corrupt_signature_does_not_abort_render() {
    let mut doc = minimal_document();
    doc.signature_image = Some(ImageAsset::new(vec![0xFF, 0xD8, 0x00, 0x01], "image/jpeg"));

    let rendered = render_invoice(&doc, &StyleConfig::default(), PageSize::A4).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert!(!contains(&rendered.bytes, b"/Subtype /Image"));
}

#[test]
fn test_unsupported_logo_encoding_is_an_error() {
    let mut doc = minimal_document();
    doc.logo_image = Some(ImageAsset::new(b"GIF89a\x01\x00".to_vec(), "image/gif"));

    let err = render_invoice(&doc, &StyleConfig::default(), PageSize::A4).unwrap_err();
    assert!(matches!(err, InvoiceError::Render(_)));
}

// ─── Draft → publish ────────────────────────────────────────────

#[test]
fn test_draft_validation_blocks_snapshot() {
    let draft = InvoiceDraft::new();
    let err: ValidationErrors = draft.snapshot(None, None).unwrap_err();
    assert!(err.0.contains(&"Client name is required".to_string()));
    assert!(err.0.contains(&"All line items must have descriptions".to_string()));
}

#[test]
fn test_draft_to_published_record() {
    let allocator = InvoiceNumberAllocator::with_defaults(Arc::new(InMemoryCounterStore::new()));
    let blobs = InMemoryBlobStore::new();
    let documents = InMemoryDocumentStore::new();

    let mut draft = InvoiceDraft::new();
    draft.client.name = "Ada Lovelace".to_string();
    draft.client.email = "ada@example.com".to_string();
    draft.details.number = allocator.allocate().unwrap();
    draft.details.issue_date = "2026-03-01".to_string();
    draft.details.due_date = "2026-03-31".to_string();
    draft.tax_rate = "10".into();

    let first = draft.line_items()[0].id.clone();
    draft.update_line_item(&first, LineItemEdit::Description("Design".to_string()));
    draft.update_line_item(&first, LineItemEdit::Quantity("2".into()));
    draft.update_line_item(&first, LineItemEdit::Rate(50.0.into()));

    let doc = draft.snapshot(None, None).unwrap();
    let record = publish_invoice(&doc, &StyleConfig::default(), PageSize::A4, &blobs, &documents).unwrap();

    assert_eq!(record.number, "HOP-75300-001");
    assert_eq!(record.totals.total, 110.0);
    assert_valid_pdf(&blobs.get("invoice-HOP-75300-001.pdf").unwrap());
    assert_eq!(documents.load("HOP-75300-001").unwrap().totals, record.totals);

    assert_eq!(allocator.allocate().unwrap(), "HOP-75300-002");
}
