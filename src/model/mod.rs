//! # Invoice Model
//!
//! The immutable snapshot the layout engine consumes. An `InvoiceDocument`
//! is built fresh per render from caller-owned editable state (see
//! [`draft`]), read during layout, and dropped once the bytes exist.
//!
//! Numeric fields are coerced exactly once, at deserialization or
//! construction: anything non-finite or unparsable becomes `0`.

pub mod draft;
pub mod money;

use serde::{Deserialize, Deserializer, Serialize};

use crate::assets::ImageAsset;

pub use money::{format_money, format_plain_number, round2, Totals};

/// A complete invoice ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub client: ClientInfo,
    pub invoice: InvoiceDetails,
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
    #[serde(default, deserialize_with = "deserialize_coerced")]
    pub tax_rate_percent: f64,
    pub line_items: Vec<LineItem>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_image"
    )]
    pub signature_image: Option<ImageAsset>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_image"
    )]
    pub logo_image: Option<ImageAsset>,
}

fn default_currency() -> String {
    "$".to_string()
}

/// The "Bill To" party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetails {
    pub number: String,
    #[serde(alias = "date")]
    pub issue_date: String,
    pub due_date: String,
}

/// One billed line. A value object: no identity survives into rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_coerced")]
    pub quantity: f64,
    #[serde(alias = "rate", default, deserialize_with = "deserialize_coerced")]
    pub unit_rate: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_rate: f64) -> Self {
        Self {
            description: description.into(),
            quantity: finite_or_zero(quantity),
            unit_rate: finite_or_zero(unit_rate),
        }
    }

    /// `round2(quantity × unit_rate)`, with non-finite inputs treated as 0.
    pub fn amount(&self) -> f64 {
        round2(finite_or_zero(self.quantity) * finite_or_zero(self.unit_rate))
    }
}

impl InvoiceDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn totals(&self) -> Totals {
        Totals::compute(&self.line_items, self.tax_rate_percent)
    }
}

/// A raw numeric field as typed by a user: either a number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// Resolve to a finite number, falling back to 0.
    pub fn coerce(&self) -> f64 {
        match self {
            NumberInput::Number(n) => finite_or_zero(*n),
            NumberInput::Text(s) => parse_number(s),
        }
    }
}

impl Default for NumberInput {
    fn default() -> Self {
        NumberInput::Number(0.0)
    }
}

impl From<f64> for NumberInput {
    fn from(n: f64) -> Self {
        NumberInput::Number(n)
    }
}

impl From<&str> for NumberInput {
    fn from(s: &str) -> Self {
        NumberInput::Text(s.to_string())
    }
}

pub(crate) fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Parse the longest numeric prefix of `input`, like a lenient form field.
///
/// Leading whitespace is skipped. `""`, `"abc"`, `"NaN"` and anything that
/// overflows to infinity yield `0`. `"12abc"` yields `12`.
pub fn parse_number(input: &str) -> f64 {
    let s = input.trim();
    if s.is_empty() {
        return 0.0;
    }

    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        log::debug!("coercing non-numeric input {:?} to 0", input);
        return 0.0;
    }
    // Exponent only counts when followed by at least one digit.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match s[..end].parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            log::debug!("coercing out-of-range input {:?} to 0", input);
            0.0
        }
    }
}

fn deserialize_coerced<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberInput>::deserialize(deserializer)?;
    Ok(raw.map(|n| n.coerce()).unwrap_or(0.0))
}

/// Blank optional strings are the same as absent ones.
fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// An inline image that can't be decoded is left out rather than
/// rejecting the whole invoice.
fn deserialize_optional_image<'de, D>(deserializer: D) -> Result<Option<ImageAsset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .and_then(|src| match ImageAsset::from_data_uri(&src) {
            Ok(asset) => Some(asset),
            Err(e) => {
                log::warn!("omitting inline image: {}", e);
                None
            }
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_lenient() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("   "), 0.0);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
        assert_eq!(parse_number("Infinity"), 0.0);
        assert_eq!(parse_number("1e999"), 0.0);
        assert_eq!(parse_number("12abc"), 12.0);
        assert_eq!(parse_number(" 2.5 "), 2.5);
        assert_eq!(parse_number(".5"), 0.5);
        assert_eq!(parse_number("-3"), -3.0);
        assert_eq!(parse_number("1e2x"), 100.0);
        assert_eq!(parse_number("4e"), 4.0);
        assert_eq!(parse_number("."), 0.0);
    }

    #[test]
    fn test_number_input_coerce() {
        assert_eq!(NumberInput::Number(f64::NAN).coerce(), 0.0);
        assert_eq!(NumberInput::Number(f64::INFINITY).coerce(), 0.0);
        assert_eq!(NumberInput::from("7").coerce(), 7.0);
        assert_eq!(NumberInput::from(1.25).coerce(), 1.25);
    }

    #[test]
    fn test_line_item_new_coerces_non_finite() {
        let item = LineItem::new("Broken", f64::NAN, f64::INFINITY);
        assert_eq!(item.quantity, 0.0);
        assert_eq!(item.unit_rate, 0.0);
        assert_eq!(item.amount(), 0.0);
    }

    #[test]
    fn test_deserialize_string_and_garbage_numbers() {
        let json = r#"{
            "client": { "name": "Ada", "email": "ada@example.com", "company": "" },
            "invoice": { "number": "HOP-75300-001", "date": "2026-01-01", "dueDate": "2026-02-01" },
            "taxRatePercent": "abc",
            "lineItems": [
                { "description": "Design", "quantity": "2", "rate": 50 },
                { "description": "Review", "quantity": null, "unitRate": "" }
            ]
        }"#;
        let doc = InvoiceDocument::from_json(json).unwrap();
        assert_eq!(doc.currency_symbol, "$");
        assert_eq!(doc.tax_rate_percent, 0.0);
        assert_eq!(doc.client.company, None);
        assert_eq!(doc.invoice.issue_date, "2026-01-01");
        assert_eq!(doc.line_items[0].quantity, 2.0);
        assert_eq!(doc.line_items[0].unit_rate, 50.0);
        assert_eq!(doc.line_items[1].quantity, 0.0);
        assert_eq!(doc.line_items[1].unit_rate, 0.0);
    }

    #[test]
    fn test_undecodable_inline_images_are_dropped() {
        let json = r#"{
            "client": { "name": "Ada", "email": "ada@example.com" },
            "invoice": { "number": "HOP-75300-001", "issueDate": "2026-01-01", "dueDate": "2026-02-01" },
            "lineItems": [],
            "signatureImage": "data:image/png;base64,@@not-base64@@",
            "logoImage": "data:image/png,plain"
        }"#;
        let doc = InvoiceDocument::from_json(json).unwrap();
        assert_eq!(doc.signature_image, None);
        assert_eq!(doc.logo_image, None);

        let blank = json
            .replace("data:image/png;base64,@@not-base64@@", "")
            .replace("\"data:image/png,plain\"", "null");
        let doc = InvoiceDocument::from_json(&blank).unwrap();
        assert_eq!(doc.signature_image, None);
        assert_eq!(doc.logo_image, None);
    }
}
