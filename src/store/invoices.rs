//! Invoice operations and the offline sync flag.

use crate::error::{Error, Result};
use crate::models::{
    Invoice, InvoiceStatus, InvoiceUpdate, JobStatus, LineItem, NewInvoice, PaymentMethod,
};

use super::events::StoreEvent;
use super::state::StoreState;

impl StoreState {
    /// Bill a job and move it to `Invoiced`.
    ///
    /// Invoices created while disconnected are offline drafts regardless of
    /// the requested status.
    pub fn create_invoice(&mut self, new: NewInvoice) -> Result<Invoice> {
        if self.is_strict() {
            if self.job(&new.job_id).is_none() {
                return Err(Error::UnknownJob(new.job_id));
            }
            self.check_job_transition(&new.job_id, JobStatus::Invoiced)?;
        }

        let id = self.next_invoice_id();
        let items = new
            .items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                LineItem::new(format!("li{}", idx + 1), item.name, item.quantity, item.unit_price)
            })
            .collect();
        let is_offline = !self.online;
        let invoice = Invoice {
            id,
            job_id: new.job_id,
            items,
            status: if is_offline { InvoiceStatus::Draft } else { new.status },
            payment_method: None,
            is_offline,
        };

        tracing::info!(
            invoice_id = %invoice.id,
            job_id = %invoice.job_id,
            total = %invoice.total(),
            is_offline,
            "invoice created"
        );
        self.invoices.push(invoice.clone());
        self.emit(StoreEvent::InvoiceCreated {
            invoice_id: invoice.id.clone(),
            job_id: invoice.job_id.clone(),
            is_offline,
        });
        self.apply_job_status(&invoice.job_id, JobStatus::Invoiced);

        Ok(invoice)
    }

    /// Move an invoice to `Sent` or `Paid`. Paying also settles the job.
    ///
    /// Unknown ids are a silent no-op.
    pub fn set_invoice_status(&mut self, invoice_id: &str, update: InvoiceUpdate) -> Result<()> {
        let to = InvoiceStatus::from(update);
        let Some((from, job_id)) = self
            .invoice(invoice_id)
            .map(|inv| (inv.status, inv.job_id.clone()))
        else {
            tracing::debug!(invoice_id, %to, "status change for unknown invoice ignored");
            return Ok(());
        };

        if self.is_strict() {
            if !from.can_transition_to(to) {
                return Err(Error::InvalidInvoiceTransition {
                    invoice_id: invoice_id.to_string(),
                    from,
                    to,
                });
            }
            if to == InvoiceStatus::Paid {
                self.check_job_transition(&job_id, JobStatus::Paid)?;
            }
        }

        if let Some(invoice) = self.invoices.iter_mut().find(|i| i.id == invoice_id) {
            invoice.status = to;
        }
        if from != to {
            self.emit(StoreEvent::InvoiceStatusChanged {
                invoice_id: invoice_id.to_string(),
                from,
                to,
            });
        }
        if to == InvoiceStatus::Paid {
            self.apply_job_status(&job_id, JobStatus::Paid);
        }
        Ok(())
    }

    /// Collect payment on an invoice.
    ///
    /// Needs a live connection and an invoice that has already synced and
    /// has not been paid.
    pub fn record_payment(&mut self, invoice_id: &str, method: PaymentMethod) -> Result<Invoice> {
        let invoice = self
            .invoice(invoice_id)
            .ok_or_else(|| Error::UnknownInvoice(invoice_id.to_string()))?;
        let unavailable = |reason| Error::PaymentUnavailable {
            invoice_id: invoice_id.to_string(),
            reason,
        };
        if invoice.status == InvoiceStatus::Paid {
            return Err(unavailable("invoice is already paid"));
        }
        if invoice.is_offline {
            return Err(unavailable("draft has not synced yet"));
        }
        if !self.online {
            return Err(unavailable("device is offline"));
        }

        self.set_invoice_status(invoice_id, InvoiceUpdate::Paid)?;

        let invoice = self
            .invoices
            .iter_mut()
            .find(|i| i.id == invoice_id)
            .ok_or_else(|| Error::UnknownInvoice(invoice_id.to_string()))?;
        invoice.payment_method = Some(method);
        let invoice = invoice.clone();
        self.emit(StoreEvent::PaymentRecorded {
            invoice_id: invoice_id.to_string(),
            method,
        });
        Ok(invoice)
    }

    /// Clear the offline flag on every draft in one update.
    ///
    /// Returns how many invoices were synced. Status is left alone.
    pub fn complete_sync(&mut self) -> usize {
        let mut synced = 0;
        for invoice in self.invoices.iter_mut().filter(|i| i.is_offline) {
            invoice.is_offline = false;
            synced += 1;
        }
        if synced > 0 {
            self.emit(StoreEvent::SyncCompleted { synced });
        }
        synced
    }

    fn next_invoice_id(&mut self) -> String {
        loop {
            let id = format!("inv-{}", self.next_invoice_seq);
            self.next_invoice_seq += 1;
            if self.invoice(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TransitionPolicy;
    use crate::models::{Money, NewLineItem};
    use crate::store::state::tests::demo_state;

    use super::*;

    fn service_call(job_id: &str) -> NewInvoice {
        NewInvoice::new(job_id, vec![NewLineItem::new("Service Call", 1, Money::from_dollars(89))])
    }

    #[test]
    fn online_invoice_keeps_requested_status() {
        let mut state = demo_state(true, TransitionPolicy::Permissive);
        let invoice = state.create_invoice(service_call("j1")).unwrap();

        assert!(!invoice.is_offline);
        assert_eq!(invoice.status, InvoiceStatus::Sent);
        assert_eq!(invoice.subtotal(), Money::from_dollars(89));
        assert_eq!(invoice.tax(), Money::from_cents(712));
        assert_eq!(invoice.total(), Money::from_cents(9612));
        assert_eq!(state.job("j1").unwrap().status, JobStatus::Invoiced);
        assert_eq!(state.pending_sync_count(), 0);
    }

    #[test]
    fn offline_invoice_is_a_draft() {
        let mut state = demo_state(false, TransitionPolicy::Permissive);
        let invoice = state
            .create_invoice(service_call("j2").with_status(InvoiceStatus::Sent))
            .unwrap();

        assert!(invoice.is_offline);
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(state.job("j2").unwrap().status, JobStatus::Invoiced);
        assert_eq!(state.pending_sync_count(), 1);
    }

    #[test]
    fn line_items_get_sequential_ids() {
        let mut state = demo_state(true, TransitionPolicy::Permissive);
        let new = NewInvoice::new(
            "j1",
            vec![
                NewLineItem::new("Service Call Fee", 1, Money::from_dollars(89)),
                NewLineItem::new("Capacitor", 2, Money::from_cents(4550)),
            ],
        );
        let invoice = state.create_invoice(new).unwrap();
        let ids: Vec<_> = invoice.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["li1", "li2"]);
        assert_eq!(invoice.subtotal(), Money::from_cents(8900 + 9100));
    }

    #[test]
    fn invoice_ids_are_unique() {
        let mut state = demo_state(true, TransitionPolicy::Permissive);
        let a = state.create_invoice(service_call("j1")).unwrap();
        let b = state.create_invoice(service_call("j2")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(state.invoice(&b.id).unwrap().job_id, "j2");
    }

    #[test]
    fn permissive_bills_unknown_job_without_touching_jobs() {
        let mut state = demo_state(true, TransitionPolicy::Permissive);
        let jobs = state.jobs().to_vec();
        state.create_invoice(service_call("ghost")).unwrap();
        assert_eq!(state.jobs(), jobs.as_slice());
        assert_eq!(state.invoices().len(), 2);
    }

    #[test]
    fn strict_refuses_unbillable_jobs() {
        let mut state = demo_state(true, TransitionPolicy::Strict);
        assert_eq!(
            state.create_invoice(service_call("ghost")).unwrap_err(),
            Error::UnknownJob("ghost".into())
        );
        assert!(matches!(
            state.create_invoice(service_call("j1")),
            Err(Error::InvalidJobTransition { .. })
        ));
        assert_eq!(state.invoices().len(), 1);

        state.create_invoice(service_call("j3")).unwrap();
        assert_eq!(state.job("j3").unwrap().status, JobStatus::Invoiced);
    }

    #[test]
    fn paying_settles_the_job() {
        let mut state = demo_state(true, TransitionPolicy::Permissive);
        let invoice = state.create_invoice(service_call("j1")).unwrap();

        state.set_invoice_status(&invoice.id, InvoiceUpdate::Paid).unwrap();
        assert_eq!(state.invoice(&invoice.id).unwrap().status, InvoiceStatus::Paid);
        assert_eq!(state.job("j1").unwrap().status, JobStatus::Paid);
    }

    #[test]
    fn paying_twice_is_idempotent() {
        let mut state = demo_state(true, TransitionPolicy::Permissive);
        let invoice = state.create_invoice(service_call("j1")).unwrap();

        state.set_invoice_status(&invoice.id, InvoiceUpdate::Paid).unwrap();
        let once = (state.jobs().to_vec(), state.invoices().to_vec());
        state.drain_events();

        state.set_invoice_status(&invoice.id, InvoiceUpdate::Paid).unwrap();
        assert_eq!((state.jobs().to_vec(), state.invoices().to_vec()), once);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn sending_does_not_touch_the_job() {
        let mut state = demo_state(false, TransitionPolicy::Permissive);
        let invoice = state.create_invoice(service_call("j1")).unwrap();
        state.set_job_status("j1", JobStatus::Completed).unwrap();

        state.set_invoice_status(&invoice.id, InvoiceUpdate::Sent).unwrap();
        assert_eq!(state.invoice(&invoice.id).unwrap().status, InvoiceStatus::Sent);
        assert_eq!(state.job("j1").unwrap().status, JobStatus::Completed);
    }

    #[test]
    fn unknown_invoice_is_ignored() {
        let mut state = demo_state(true, TransitionPolicy::Strict);
        let before = (state.jobs().to_vec(), state.invoices().to_vec());
        state.set_invoice_status("nope", InvoiceUpdate::Paid).unwrap();
        assert_eq!((state.jobs().to_vec(), state.invoices().to_vec()), before);
    }

    #[test]
    fn strict_blocks_unpaying() {
        let mut state = demo_state(true, TransitionPolicy::Strict);
        let err = state.set_invoice_status("inv1", InvoiceUpdate::Sent).unwrap_err();
        assert!(matches!(err, Error::InvalidInvoiceTransition { .. }));
        assert_eq!(state.invoice("inv1").unwrap().status, InvoiceStatus::Paid);
    }

    #[test]
    fn sync_clears_every_offline_flag_and_keeps_status() {
        let mut state = demo_state(false, TransitionPolicy::Permissive);
        let a = state.create_invoice(service_call("j1")).unwrap();
        let b = state.create_invoice(service_call("j2")).unwrap();
        assert_eq!(state.pending_sync_count(), 2);
        state.drain_events();

        assert_eq!(state.complete_sync(), 2);
        assert_eq!(state.pending_sync_count(), 0);
        for id in [&a.id, &b.id] {
            let inv = state.invoice(id).unwrap();
            assert!(!inv.is_offline);
            assert_eq!(inv.status, InvoiceStatus::Draft);
        }
        assert_eq!(state.drain_events(), vec![StoreEvent::SyncCompleted { synced: 2 }]);
        assert_eq!(state.complete_sync(), 0);
    }

    #[test]
    fn payment_requires_connection_and_synced_invoice() {
        let mut state = demo_state(false, TransitionPolicy::Permissive);
        let invoice = state.create_invoice(service_call("j1")).unwrap();

        let err = state.record_payment(&invoice.id, PaymentMethod::Cash).unwrap_err();
        assert!(matches!(err, Error::PaymentUnavailable { .. }));

        state.set_online(true);
        assert!(state.record_payment(&invoice.id, PaymentMethod::Cash).is_err());

        state.complete_sync();
        let paid = state.record_payment(&invoice.id, PaymentMethod::Cash).unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(paid.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(state.job("j1").unwrap().status, JobStatus::Paid);

        assert_eq!(
            state.record_payment("nope", PaymentMethod::Card).unwrap_err(),
            Error::UnknownInvoice("nope".into())
        );
    }

    #[test]
    fn paid_invoice_refuses_second_payment() {
        let mut state = demo_state(true, TransitionPolicy::Permissive);
        let invoice = state.create_invoice(service_call("j1")).unwrap();
        state.record_payment(&invoice.id, PaymentMethod::Cash).unwrap();
        state.drain_events();

        let err = state.record_payment(&invoice.id, PaymentMethod::Card).unwrap_err();
        assert_eq!(
            err,
            Error::PaymentUnavailable {
                invoice_id: invoice.id.clone(),
                reason: "invoice is already paid",
            }
        );
        assert_eq!(state.invoice(&invoice.id).unwrap().payment_method, Some(PaymentMethod::Cash));
        assert!(state.drain_events().is_empty());

        assert!(matches!(
            state.record_payment("inv1", PaymentMethod::Cash),
            Err(Error::PaymentUnavailable { .. })
        ));
        assert_eq!(state.invoice("inv1").unwrap().payment_method, Some(PaymentMethod::Card));
    }

    #[test]
    fn strict_paying_checks_the_job_first() {
        let mut state = demo_state(true, TransitionPolicy::Strict);
        let invoice = state.create_invoice(service_call("j3")).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Sent);

        // Walk the job back, which only the permissive policy allows.
        state.policy = TransitionPolicy::Permissive;
        state.set_job_status("j3", JobStatus::Completed).unwrap();
        state.policy = TransitionPolicy::Strict;
        state.drain_events();

        let err = state.set_invoice_status(&invoice.id, InvoiceUpdate::Paid).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidJobTransition {
                job_id: "j3".into(),
                from: JobStatus::Completed,
                to: JobStatus::Paid,
            }
        );
        assert_eq!(state.invoice(&invoice.id).unwrap().status, InvoiceStatus::Sent);
        assert_eq!(state.job("j3").unwrap().status, JobStatus::Completed);
        assert!(state.drain_events().is_empty());
    }
}
