//! Structured error types for the invoice engine.
//!
//! Only structural failures surface here. Numeric coercion and missing
//! image assets are recovered where they happen and never reach the caller.

use thiserror::Error;

use crate::assets::AssetError;
use crate::store::StoreError;

/// The unified error type returned by the public API.
#[derive(Error, Debug)]
pub enum InvoiceError {
    /// JSON input failed to parse as an invoice or style document.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// An asset could not be produced where one was strictly required.
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// The paint pass failed. No partial output is ever returned.
    #[error("Render error: {0}")]
    Render(String),

    /// A persistence collaborator rejected the request.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for InvoiceError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the invoice schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        InvoiceError::Parse { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
