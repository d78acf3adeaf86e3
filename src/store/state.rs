use serde::Serialize;

use crate::config::TransitionPolicy;
use crate::models::{Customer, Equipment, Invoice, Job, User};
use crate::seed::Seed;

use super::events::StoreEvent;

/// Everything the store owns. Only the store task touches this.
#[derive(Debug)]
pub struct StoreState {
    pub(super) policy: TransitionPolicy,
    pub(super) users: Vec<User>,
    pub(super) customers: Vec<Customer>,
    pub(super) equipment: Vec<Equipment>,
    pub(super) jobs: Vec<Job>,
    pub(super) invoices: Vec<Invoice>,
    pub(super) current_user_id: Option<String>,
    pub(super) online: bool,
    pub(super) next_invoice_seq: u64,
    outbox: Vec<StoreEvent>,
}

/// Point-in-time copy of the whole store.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub current_user: Option<User>,
    pub users: Vec<User>,
    pub customers: Vec<Customer>,
    pub equipment: Vec<Equipment>,
    pub jobs: Vec<Job>,
    pub invoices: Vec<Invoice>,
    pub is_online: bool,
    pub pending_sync_count: usize,
}

impl StoreState {
    pub fn new(seed: Seed, online: bool, policy: TransitionPolicy) -> Self {
        let current_user_id = seed.users.first().map(|u| u.id.clone());
        Self {
            policy,
            users: seed.users,
            customers: seed.customers,
            equipment: seed.equipment,
            jobs: seed.jobs,
            invoices: seed.invoices,
            current_user_id,
            online,
            next_invoice_seq: 1,
            outbox: Vec::new(),
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, job_id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == job_id)
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn invoice(&self, invoice_id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == invoice_id)
    }

    /// First invoice billed against `job_id`.
    pub fn invoice_for_job(&self, job_id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.job_id == job_id)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn equipment(&self) -> &[Equipment] {
        &self.equipment
    }

    pub fn current_user(&self) -> Option<&User> {
        let id = self.current_user_id.as_deref()?;
        self.users.iter().find(|u| u.id == id)
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Offline drafts waiting to sync. Counted on every call.
    pub fn pending_sync_count(&self) -> usize {
        self.invoices.iter().filter(|i| i.is_offline).count()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_user: self.current_user().cloned(),
            users: self.users.clone(),
            customers: self.customers.clone(),
            equipment: self.equipment.clone(),
            jobs: self.jobs.clone(),
            invoices: self.invoices.clone(),
            is_online: self.online,
            pending_sync_count: self.pending_sync_count(),
        }
    }

    /// Switch the acting user. Unknown ids are ignored.
    pub fn set_current_user(&mut self, user_id: &str) {
        if !self.users.iter().any(|u| u.id == user_id) {
            tracing::debug!(user_id, "ignoring switch to unknown user");
            return;
        }
        if self.current_user_id.as_deref() == Some(user_id) {
            return;
        }
        self.current_user_id = Some(user_id.to_string());
        self.emit(StoreEvent::CurrentUserChanged {
            user_id: user_id.to_string(),
        });
    }

    pub fn set_online(&mut self, online: bool) {
        if self.online == online {
            return;
        }
        self.online = online;
        self.emit(StoreEvent::ConnectivityChanged { online });
    }

    pub(super) fn emit(&mut self, event: StoreEvent) {
        self.outbox.push(event);
    }

    pub(super) fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub(super) fn is_strict(&self) -> bool {
        self.policy == TransitionPolicy::Strict
    }
}

#[cfg(test)]
pub(super) mod tests {
    use chrono::NaiveDate;

    use super::*;

    pub(crate) fn demo_state(online: bool, policy: TransitionPolicy) -> StoreState {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        StoreState::new(Seed::demo(today), online, policy)
    }

    #[test]
    fn starts_as_first_user() {
        let state = demo_state(true, TransitionPolicy::Permissive);
        assert_eq!(state.current_user().map(|u| u.id.as_str()), Some("u1"));
    }

    #[test]
    fn switching_to_unknown_user_is_ignored() {
        let mut state = demo_state(true, TransitionPolicy::Permissive);
        state.set_current_user("nobody");
        assert_eq!(state.current_user().unwrap().id, "u1");
        assert!(state.drain_events().is_empty());

        state.set_current_user("u2");
        assert_eq!(state.current_user().unwrap().id, "u2");
        assert_eq!(
            state.drain_events(),
            vec![StoreEvent::CurrentUserChanged { user_id: "u2".into() }]
        );
    }

    #[test]
    fn connectivity_change_emits_once() {
        let mut state = demo_state(true, TransitionPolicy::Permissive);
        state.set_online(true);
        state.set_online(false);
        state.set_online(false);
        assert_eq!(
            state.drain_events(),
            vec![StoreEvent::ConnectivityChanged { online: false }]
        );
    }

    #[test]
    fn empty_seed_has_no_user() {
        let state = StoreState::new(Seed::default(), false, TransitionPolicy::Permissive);
        assert!(state.current_user().is_none());
        assert_eq!(state.pending_sync_count(), 0);
    }
}
