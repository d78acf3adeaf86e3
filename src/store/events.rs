use std::fmt;

use serde::Serialize;

use crate::models::{InvoiceStatus, JobStatus, PaymentMethod};

/// Notification published to store observers after each applied change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    CurrentUserChanged {
        user_id: String,
    },
    JobAdded {
        job_id: String,
    },
    JobStatusChanged {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },
    InvoiceCreated {
        invoice_id: String,
        job_id: String,
        is_offline: bool,
    },
    InvoiceStatusChanged {
        invoice_id: String,
        from: InvoiceStatus,
        to: InvoiceStatus,
    },
    PaymentRecorded {
        invoice_id: String,
        method: PaymentMethod,
    },
    ConnectivityChanged {
        online: bool,
    },
    SyncScheduled {
        pending: usize,
        delay_ms: u64,
    },
    SyncCancelled,
    SyncCompleted {
        synced: usize,
    },
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreEvent::CurrentUserChanged { user_id } => write!(f, "acting user is now {user_id}"),
            StoreEvent::JobAdded { job_id } => write!(f, "job {job_id} added"),
            StoreEvent::JobStatusChanged { job_id, from, to } => {
                write!(f, "job {job_id}: {from} -> {to}")
            }
            StoreEvent::InvoiceCreated {
                invoice_id,
                job_id,
                is_offline,
            } => {
                let mode = if *is_offline { "offline draft" } else { "online" };
                write!(f, "invoice {invoice_id} created for job {job_id} ({mode})")
            }
            StoreEvent::InvoiceStatusChanged { invoice_id, from, to } => {
                write!(f, "invoice {invoice_id}: {from} -> {to}")
            }
            StoreEvent::PaymentRecorded { invoice_id, method } => {
                write!(f, "invoice {invoice_id} paid via {method}")
            }
            StoreEvent::ConnectivityChanged { online: true } => f.write_str("connected"),
            StoreEvent::ConnectivityChanged { online: false } => f.write_str("disconnected"),
            StoreEvent::SyncScheduled { pending, delay_ms } => {
                write!(f, "syncing {pending} item(s) in {delay_ms}ms")
            }
            StoreEvent::SyncCancelled => f.write_str("pending sync cancelled"),
            StoreEvent::SyncCompleted { synced } => write!(f, "sync complete ({synced} item(s))"),
        }
    }
}
