//! In-process store implementations.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use super::{BlobRef, BlobStore, CounterStore, DocumentStore, InvoiceRecord, StoreError};

fn poisoned(what: &str) -> StoreError {
    StoreError::Backend(format!("{} lock poisoned", what))
}

/// Counters behind a mutex; `compare_and_swap` is atomic under the lock.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<String, u64>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a counter, e.g. when migrating from an existing sequence.
    pub fn with_value(self, key: impl Into<String>, value: u64) -> Self {
        if let Ok(mut counters) = self.counters.lock() {
            counters.insert(key.into(), value);
        }
        self
    }
}

impl CounterStore for InMemoryCounterStore {
    fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let counters = self.counters.lock().map_err(|_| poisoned("counter"))?;
        Ok(counters.get(key).copied())
    }

    fn compare_and_swap(&self, key: &str, expected: Option<u64>, new: u64) -> Result<bool, StoreError> {
        let mut counters = self.counters.lock().map_err(|_| poisoned("counter"))?;
        if counters.get(key).copied() != expected {
            return Ok(false);
        }
        counters.insert(key.to_string(), new);
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for InMemoryBlobStore {
    /// Uploads overwrite an existing blob under the same key.
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<BlobRef, StoreError> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned("blob"))?;
        blobs.insert(key.to_string(), (content_type.to_string(), bytes.to_vec()));
        Ok(BlobRef {
            key: key.to_string(),
            size: bytes.len(),
            content_type: content_type.to_string(),
        })
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let blobs = self.blobs.read().map_err(|_| poisoned("blob"))?;
        blobs
            .get(key)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    records: RwLock<HashMap<String, InvoiceRecord>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn save(&self, record: &InvoiceRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned("document"))?;
        if records.contains_key(&record.number) {
            return Err(StoreError::Conflict(record.number.clone()));
        }
        records.insert(record.number.clone(), record.clone());
        Ok(())
    }

    fn load(&self, number: &str) -> Result<InvoiceRecord, StoreError> {
        let records = self.records.read().map_err(|_| poisoned("document"))?;
        records
            .get(number)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(number.to_string()))
    }
}
