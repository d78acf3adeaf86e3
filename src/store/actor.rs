use tokio::sync::{broadcast, mpsc, oneshot};

use crate::connectivity::ConnectivityWatcher;

use super::events::StoreEvent;
use super::state::StoreState;
use super::sync::SyncScheduler;

pub(super) type ReadFn = Box<dyn FnOnce(&StoreState) + Send>;
pub(super) type WriteFn = Box<dyn FnOnce(&mut StoreState) + Send>;

pub(super) enum Command {
    Read(ReadFn),
    Write(WriteFn),
    Shutdown(oneshot::Sender<()>),
}

/// The single writer. Owns the state, the connectivity subscription and the
/// sync timer, and applies one message at a time.
pub(super) struct StoreActor {
    state: StoreState,
    sync: SyncScheduler,
    connectivity: Option<ConnectivityWatcher>,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<StoreEvent>,
}

impl StoreActor {
    pub(super) fn new(
        state: StoreState,
        sync: SyncScheduler,
        connectivity: ConnectivityWatcher,
        commands: mpsc::Receiver<Command>,
        events: broadcast::Sender<StoreEvent>,
    ) -> Self {
        Self {
            state,
            sync,
            connectivity: Some(connectivity),
            commands,
            events,
        }
    }

    pub(super) async fn run(mut self) {
        tracing::debug!(online = self.state.is_online(), "store started");
        self.reconcile_sync();
        self.publish();

        let shutdown_ack = loop {
            tokio::select! {
                biased;

                transition = next_transition(&mut self.connectivity) => match transition {
                    Some(event) => self.state.set_online(event.is_connected()),
                    None => {
                        tracing::debug!("connectivity source closed");
                        self.connectivity = None;
                    }
                },
                () = self.sync.fired() => {
                    let synced = self.state.complete_sync();
                    tracing::info!(synced, "sync complete");
                }
                command = self.commands.recv() => match command {
                    Some(Command::Read(read)) => read(&self.state),
                    Some(Command::Write(write)) => write(&mut self.state),
                    Some(Command::Shutdown(ack)) => break Some(ack),
                    None => break None,
                },
            }

            self.reconcile_sync();
            self.publish();
        };

        if self.sync.cancel() {
            tracing::debug!("dropping pending sync on shutdown");
        }
        self.connectivity = None;
        self.commands.close();
        tracing::debug!("store stopped");
        if let Some(ack) = shutdown_ack {
            let _ = ack.send(());
        }
    }

    /// Re-arm or cancel the sync timer for the current state.
    fn reconcile_sync(&mut self) {
        let online = self.state.is_online();
        let pending = self.state.pending_sync_count();
        let change = self.sync.observe(online, pending);

        if change.cancelled {
            tracing::debug!(online, pending, "superseded sync cancelled");
            self.state.emit(StoreEvent::SyncCancelled);
        }
        if let Some(pending) = change.armed {
            let delay_ms = self.sync.latency().as_millis() as u64;
            tracing::info!(pending, delay_ms, "syncing offline drafts");
            self.state.emit(StoreEvent::SyncScheduled { pending, delay_ms });
        }
    }

    fn publish(&mut self) {
        for event in self.state.drain_events() {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

async fn next_transition(
    watcher: &mut Option<ConnectivityWatcher>,
) -> Option<crate::connectivity::ConnectivityEvent> {
    match watcher {
        Some(watcher) => watcher.next_transition().await,
        None => std::future::pending().await,
    }
}
