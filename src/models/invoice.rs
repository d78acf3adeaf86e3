use std::fmt;

use serde::{Deserialize, Serialize};

use super::{LineItem, Money, NewLineItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
}

impl InvoiceStatus {
    /// Strict transition table. A draft may be paid directly once it has synced.
    pub fn can_transition_to(self, to: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, to),
            (Draft, Draft) | (Sent, Sent) | (Paid, Paid) | (Draft, Sent) | (Draft, Paid) | (Sent, Paid)
        )
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Paid => "PAID",
        };
        f.write_str(label)
    }
}

/// Statuses a caller may move an existing invoice to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceUpdate {
    Sent,
    Paid,
}

impl From<InvoiceUpdate> for InvoiceStatus {
    fn from(update: InvoiceUpdate) -> Self {
        match update {
            InvoiceUpdate::Sent => InvoiceStatus::Sent,
            InvoiceUpdate::Paid => InvoiceStatus::Paid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Cash,
    Online,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Online => "ONLINE",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub job_id: String,
    pub items: Vec<LineItem>,
    pub status: InvoiceStatus,
    pub payment_method: Option<PaymentMethod>,
    /// Drafted while disconnected and not yet synced.
    pub is_offline: bool,
}

impl Invoice {
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::total).sum()
    }

    pub fn tax(&self) -> Money {
        self.subtotal().tax()
    }

    pub fn total(&self) -> Money {
        let subtotal = self.subtotal();
        subtotal + subtotal.tax()
    }
}

/// Request to bill a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub job_id: String,
    pub items: Vec<NewLineItem>,
    /// Status used when the invoice is created while connected.
    /// Offline invoices always start as drafts.
    pub status: InvoiceStatus,
}

impl NewInvoice {
    pub fn new(job_id: impl Into<String>, items: Vec<NewLineItem>) -> Self {
        Self {
            job_id: job_id.into(),
            items,
            status: InvoiceStatus::Sent,
        }
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }
}
