mod customer;
mod equipment;
mod invoice;
mod job;
mod line_item;
mod money;
mod user;

pub use customer::Customer;
pub use equipment::Equipment;
pub use invoice::{Invoice, InvoiceStatus, InvoiceUpdate, NewInvoice, PaymentMethod};
pub use job::{Job, JobKind, JobStatus, Location};
pub use line_item::{LineItem, NewLineItem};
pub use money::{Money, TAX_RATE_BPS};
pub use user::{Role, User};
