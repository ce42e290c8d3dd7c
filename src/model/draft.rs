//! Editable invoice state owned by a form or CLI front end.
//!
//! A draft keeps numeric fields exactly as typed and gives each line item a
//! stable id for editing. Nothing here reaches the layout engine directly:
//! [`InvoiceDraft::snapshot`] validates, coerces once, and hands back an
//! immutable [`InvoiceDocument`].

use chrono::{Local, NaiveDate};
use thiserror::Error;

use super::{ClientInfo, InvoiceDetails, InvoiceDocument, LineItem, NumberInput, Totals};
use crate::assets::ImageAsset;

/// Messages describing why a draft can't be rendered yet.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

#[derive(Debug, Clone, PartialEq)]
pub struct DraftLineItem {
    pub id: String,
    pub description: String,
    pub quantity: NumberInput,
    pub rate: NumberInput,
}

/// Which field of a line item an edit targets.
#[derive(Debug, Clone, PartialEq)]
pub enum LineItemEdit {
    Description(String),
    Quantity(NumberInput),
    Rate(NumberInput),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub client: ClientInfo,
    pub details: InvoiceDetails,
    pub currency_symbol: String,
    pub tax_rate: NumberInput,
    line_items: Vec<DraftLineItem>,
    next_id: u64,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceDraft {
    /// A blank draft dated today, with a single empty line item.
    pub fn new() -> Self {
        Self::dated(Local::now().date_naive())
    }

    /// A blank draft with the given issue date.
    pub fn dated(issue_date: NaiveDate) -> Self {
        Self {
            client: ClientInfo::default(),
            details: InvoiceDetails {
                issue_date: issue_date.format("%Y-%m-%d").to_string(),
                ..InvoiceDetails::default()
            },
            currency_symbol: "$".to_string(),
            tax_rate: NumberInput::Number(0.0),
            line_items: vec![Self::blank_item("1")],
            next_id: 2,
        }
    }

    fn blank_item(id: &str) -> DraftLineItem {
        DraftLineItem {
            id: id.to_string(),
            description: String::new(),
            quantity: NumberInput::Number(1.0),
            rate: NumberInput::Number(0.0),
        }
    }

    pub fn line_items(&self) -> &[DraftLineItem] {
        &self.line_items
    }

    /// Append a blank line item and return its id.
    pub fn add_line_item(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        self.line_items.push(Self::blank_item(&id));
        id
    }

    /// Remove a line item. The last remaining item is never removed.
    pub fn remove_line_item(&mut self, id: &str) -> bool {
        if self.line_items.len() <= 1 {
            return false;
        }
        let before = self.line_items.len();
        self.line_items.retain(|item| item.id != id);
        self.line_items.len() != before
    }

    /// Apply an edit to one line item. Returns false for an unknown id.
    pub fn update_line_item(&mut self, id: &str, edit: LineItemEdit) -> bool {
        let Some(item) = self.line_items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        match edit {
            LineItemEdit::Description(d) => item.description = d,
            LineItemEdit::Quantity(q) => item.quantity = q,
            LineItemEdit::Rate(r) => item.rate = r,
        }
        true
    }

    /// Live totals for a preview, computed the same way as the document.
    pub fn totals(&self) -> Totals {
        Totals::compute(&self.coerced_items(), self.tax_rate.coerce())
    }

    /// Reset to a blank draft dated today, keeping the currency symbol.
    pub fn clear(&mut self) {
        let currency_symbol = std::mem::take(&mut self.currency_symbol);
        *self = Self::new();
        self.currency_symbol = currency_symbol;
    }

    /// Required-field checks, in form order.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.client.name.trim().is_empty() {
            errors.push("Client name is required".to_string());
        }
        if self.client.email.trim().is_empty() {
            errors.push("Client email is required".to_string());
        }
        if self.details.number.trim().is_empty() {
            errors.push("Invoice number is required".to_string());
        }
        if self.details.issue_date.is_empty() {
            errors.push("Invoice date is required".to_string());
        }
        if self.details.due_date.is_empty() {
            errors.push("Due date is required".to_string());
        }
        if self
            .line_items
            .iter()
            .any(|item| item.description.trim().is_empty())
        {
            errors.push("All line items must have descriptions".to_string());
        }
        errors
    }

    /// Validate and freeze the draft into a render-ready document.
    pub fn snapshot(
        &self,
        logo_image: Option<ImageAsset>,
        signature_image: Option<ImageAsset>,
    ) -> Result<InvoiceDocument, ValidationErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        let blank_to_none = |s: &Option<String>| s.clone().filter(|v| !v.trim().is_empty());
        Ok(InvoiceDocument {
            client: ClientInfo {
                name: self.client.name.clone(),
                email: self.client.email.clone(),
                company: blank_to_none(&self.client.company),
                address: blank_to_none(&self.client.address),
            },
            invoice: self.details.clone(),
            currency_symbol: self.currency_symbol.clone(),
            tax_rate_percent: self.tax_rate.coerce(),
            line_items: self.coerced_items(),
            signature_image,
            logo_image,
        })
    }

    fn coerced_items(&self) -> Vec<LineItem> {
        self.line_items
            .iter()
            .map(|item| {
                LineItem::new(
                    item.description.clone(),
                    item.quantity.coerce(),
                    item.rate.coerce(),
                )
            })
            .collect()
    }
}
