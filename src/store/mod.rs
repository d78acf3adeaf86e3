//! The application store: one task that owns every collection.
//!
//! Callers hold a cheap, cloneable [`AppStore`] handle. Reads and writes are
//! sent to the store task as messages and applied one at a time, so a caller
//! never observes a half-applied change. Observers subscribe to
//! [`StoreEvent`]s, published after each change lands.

mod actor;
mod events;
mod invoices;
mod jobs;
mod state;
mod sync;

use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::config::{Config, TransitionPolicy};
use crate::connectivity::ConnectivitySignal;
use crate::error::Result;
use crate::models::{
    Customer, Equipment, Invoice, InvoiceUpdate, Job, JobStatus, NewInvoice, PaymentMethod, User,
};
use crate::seed::Seed;

use actor::{Command, StoreActor};
use state::StoreState;
use sync::SyncScheduler;

pub use events::StoreEvent;
pub use state::Snapshot;

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 256;

/// Knobs for a store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Delay between reconnecting and offline drafts being marked synced.
    pub sync_latency: Duration,
    pub transition_policy: TransitionPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            sync_latency: Duration::from_secs(2),
            transition_policy: TransitionPolicy::Permissive,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            sync_latency: config.sync_latency(),
            transition_policy: config.transition_policy,
        }
    }
}

/// Handle to a running store.
#[derive(Debug, Clone)]
pub struct AppStore {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<StoreEvent>,
}

impl AppStore {
    /// Start the store task on the current tokio runtime.
    ///
    /// Connectivity is read from `signal` now and followed until shutdown.
    pub fn spawn<S: ConnectivitySignal>(seed: Seed, signal: &S, options: StoreOptions) -> Self {
        let watcher = signal.subscribe();
        let state = StoreState::new(seed, watcher.is_online(), options.transition_policy);
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let actor = StoreActor::new(
            state,
            SyncScheduler::new(options.sync_latency),
            watcher,
            rx,
            events.clone(),
        );
        tokio::spawn(actor.run());

        Self { commands, events }
    }

    /// Observe every change applied from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Stop the store task, dropping any pending sync and the connectivity
    /// subscription. Later calls on any handle return [`crate::Error::StoreClosed`].
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Shutdown(tx)).await?;
        rx.await?;
        Ok(())
    }

    async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&StoreState) -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let read = Box::new(move |state: &StoreState| {
            let _ = tx.send(f(state));
        });
        self.commands.send(Command::Read(read)).await?;
        Ok(rx.await?)
    }

    async fn write<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut StoreState) -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let write = Box::new(move |state: &mut StoreState| {
            let _ = tx.send(f(state));
        });
        self.commands.send(Command::Write(write)).await?;
        Ok(rx.await?)
    }

    // Reads

    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.read(StoreState::snapshot).await
    }

    pub async fn jobs(&self) -> Result<Vec<Job>> {
        self.read(|s| s.jobs().to_vec()).await
    }

    pub async fn job(&self, job_id: &str) -> Result<Option<Job>> {
        let job_id = job_id.to_string();
        self.read(move |s| s.job(&job_id).cloned()).await
    }

    pub async fn jobs_on(&self, date: NaiveDate) -> Result<Vec<Job>> {
        self.read(move |s| s.jobs_on(date).cloned().collect()).await
    }

    pub async fn jobs_for_tech(&self, tech_id: &str) -> Result<Vec<Job>> {
        let tech_id = tech_id.to_string();
        self.read(move |s| s.jobs_for_tech(&tech_id).cloned().collect())
            .await
    }

    /// Jobs whose status is neither completed nor paid.
    pub async fn active_jobs(&self) -> Result<Vec<Job>> {
        self.read(|s| s.active_jobs().cloned().collect()).await
    }

    pub async fn invoices(&self) -> Result<Vec<Invoice>> {
        self.read(|s| s.invoices().to_vec()).await
    }

    pub async fn invoice(&self, invoice_id: &str) -> Result<Option<Invoice>> {
        let invoice_id = invoice_id.to_string();
        self.read(move |s| s.invoice(&invoice_id).cloned()).await
    }

    pub async fn invoice_for_job(&self, job_id: &str) -> Result<Option<Invoice>> {
        let job_id = job_id.to_string();
        self.read(move |s| s.invoice_for_job(&job_id).cloned()).await
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.read(|s| s.users().to_vec()).await
    }

    pub async fn customers(&self) -> Result<Vec<Customer>> {
        self.read(|s| s.customers().to_vec()).await
    }

    pub async fn equipment(&self) -> Result<Vec<Equipment>> {
        self.read(|s| s.equipment().to_vec()).await
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        self.read(|s| s.current_user().cloned()).await
    }

    pub async fn is_online(&self) -> Result<bool> {
        self.read(StoreState::is_online).await
    }

    pub async fn pending_sync_count(&self) -> Result<usize> {
        self.read(StoreState::pending_sync_count).await
    }

    // Mutators

    /// Switch the acting user. Unknown ids are ignored.
    pub async fn set_current_user(&self, user_id: &str) -> Result<()> {
        let user_id = user_id.to_string();
        self.write(move |s| s.set_current_user(&user_id)).await
    }

    /// Assign a job status. Unknown ids are ignored.
    pub async fn set_job_status(&self, job_id: &str, status: JobStatus) -> Result<()> {
        let job_id = job_id.to_string();
        self.write(move |s| s.set_job_status(&job_id, status)).await?
    }

    pub async fn add_job(&self, job: Job) -> Result<()> {
        self.write(move |s| s.add_job(job)).await
    }

    /// Bill a job. The job moves to `Invoiced` whether or not we are online.
    pub async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice> {
        self.write(move |s| s.create_invoice(invoice)).await?
    }

    /// Mark an invoice sent or paid. Unknown ids are ignored.
    pub async fn set_invoice_status(&self, invoice_id: &str, update: InvoiceUpdate) -> Result<()> {
        let invoice_id = invoice_id.to_string();
        self.write(move |s| s.set_invoice_status(&invoice_id, update))
            .await?
    }

    /// Collect payment on a synced invoice while online.
    pub async fn record_payment(&self, invoice_id: &str, method: PaymentMethod) -> Result<Invoice> {
        let invoice_id = invoice_id.to_string();
        self.write(move |s| s.record_payment(&invoice_id, method))
            .await?
    }
}
