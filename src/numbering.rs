//! Sequential invoice numbers of the form `<prefix>-<location>-<NNN>`.
//!
//! One counter per location code lives in a [`CounterStore`]. Allocation
//! reads the counter and advances it with a compare-and-swap, retrying when
//! another writer moved it in between, so concurrent callers never receive
//! the same number.

use std::sync::Arc;

use crate::store::{CounterStore, StoreError};

pub const DEFAULT_PREFIX: &str = "HOP";
pub const DEFAULT_LOCATION_CODE: &str = "75300";

const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// `HOP`, `75300`, `7` → `HOP-75300-007`. Sequences past 999 widen.
pub fn format_invoice_number(prefix: &str, location_code: &str, sequence: u64) -> String {
    format!("{}-{}-{:03}", prefix, location_code, sequence)
}

#[derive(Debug, Clone)]
pub struct InvoiceNumberAllocator {
    prefix: String,
    location_code: String,
    store: Arc<dyn CounterStore>,
    max_attempts: u32,
}

impl InvoiceNumberAllocator {
    pub fn new(prefix: impl Into<String>, location_code: impl Into<String>, store: Arc<dyn CounterStore>) -> Self {
        Self {
            prefix: prefix.into(),
            location_code: location_code.into(),
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Allocator for the default office.
    pub fn with_defaults(store: Arc<dyn CounterStore>) -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_LOCATION_CODE, store)
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Claim the next number. The first number for a location is `001`.
    pub fn allocate(&self) -> Result<String, StoreError> {
        let key = self.location_code.as_str();

        for attempt in 1..=self.max_attempts {
            let current = self.store.get(key)?;
            let next = current.unwrap_or(0) + 1;
            if self.store.compare_and_swap(key, current, next)? {
                let number = format_invoice_number(&self.prefix, &self.location_code, next);
                log::debug!("allocated {} on attempt {}", number, attempt);
                return Ok(number);
            }
            log::debug!("counter {} moved during allocation, retrying", key);
        }

        log::warn!(
            "giving up on counter {} after {} attempts",
            key,
            self.max_attempts
        );
        Err(StoreError::Contention {
            key: key.to_string(),
            attempts: self.max_attempts,
        })
    }
}
