//! # Persistence Collaborators
//!
//! Traits for the storage the invoice workflow calls into once a PDF
//! exists: a compare-and-swap counter for invoice numbers, a blob store for
//! the rendered bytes, and a document store for the invoice record.
//!
//! Backends are injected; [`memory`] ships in-process implementations.
//! Nothing here retries: a failure is reported to the caller as-is.

pub mod memory;

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::model::{InvoiceDocument, Totals};
use crate::pdf::RenderedDocument;
use crate::style::{PageSize, StyleConfig};

pub use memory::{InMemoryBlobStore, InMemoryCounterStore, InMemoryDocumentStore};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Counter '{key}' kept changing; gave up after {attempts} attempts")]
    Contention { key: String, attempts: u32 },

    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Named integer counters with a single conditional-update primitive.
pub trait CounterStore: Send + Sync + Debug {
    /// Current value, or `None` if the counter has never been set.
    fn get(&self, key: &str) -> std::result::Result<Option<u64>, StoreError>;

    /// Set `key` to `new` only if it still holds `expected` (`None` meaning
    /// absent). Returns `false` when another writer got there first.
    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<u64>,
        new: u64,
    ) -> std::result::Result<bool, StoreError>;
}

/// Where an uploaded blob ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
    pub key: String,
    pub size: usize,
    pub content_type: String,
}

pub trait BlobStore: Send + Sync + Debug {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> std::result::Result<BlobRef, StoreError>;

    fn get(&self, key: &str) -> std::result::Result<Vec<u8>, StoreError>;
}

/// The persisted form of a published invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub number: String,
    pub document: InvoiceDocument,
    pub totals: Totals,
    pub pdf: BlobRef,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
}

/// Invoice records keyed by invoice number.
pub trait DocumentStore: Send + Sync + Debug {
    /// Insert a new record. Fails with `Conflict` if the number is taken.
    fn save(&self, record: &InvoiceRecord) -> std::result::Result<(), StoreError>;

    fn load(&self, number: &str) -> std::result::Result<InvoiceRecord, StoreError>;
}

/// Render an invoice, upload the PDF, then save its record.
///
/// A number that already has a record is rejected with `Conflict` before
/// anything is uploaded, so the stored PDF keeps matching its record. The
/// record is only written after the upload succeeds, so a stored record
/// always points at an existing blob.
pub fn publish_invoice(
    document: &InvoiceDocument,
    style: &StyleConfig,
    page_size: PageSize,
    blobs: &dyn BlobStore,
    documents: &dyn DocumentStore,
) -> Result<InvoiceRecord> {
    let rendered = crate::render_invoice(document, style, page_size)?;
    let number = document.invoice.number.clone();
    match documents.load(&number) {
        Ok(_) => return Err(StoreError::Conflict(number).into()),
        Err(StoreError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let key = RenderedDocument::file_name(&number);
    let pdf = blobs.put(&key, &rendered.bytes, "application/pdf")?;
    log::info!("uploaded {} ({} bytes)", pdf.key, pdf.size);

    let record = InvoiceRecord {
        number,
        document: document.clone(),
        totals: document.totals(),
        pdf,
        created_at: unix_seconds(),
    };
    documents.save(&record)?;
    log::info!("saved invoice record {}", record.number);

    Ok(record)
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
