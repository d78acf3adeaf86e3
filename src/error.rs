use crate::models::{InvoiceStatus, JobStatus};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("store task has shut down")]
    StoreClosed,
    #[error("unknown job {0}")]
    UnknownJob(String),
    #[error("unknown invoice {0}")]
    UnknownInvoice(String),
    #[error("job {job_id} cannot move from {from} to {to}")]
    InvalidJobTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },
    #[error("invoice {invoice_id} cannot move from {from} to {to}")]
    InvalidInvoiceTransition {
        invoice_id: String,
        from: InvoiceStatus,
        to: InvoiceStatus,
    },
    #[error("payment unavailable for invoice {invoice_id}: {reason}")]
    PaymentUnavailable {
        invoice_id: String,
        reason: &'static str,
    },
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Error::StoreClosed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::StoreClosed
    }
}
