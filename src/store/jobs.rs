//! Job lifecycle operations.

use crate::error::{Error, Result};
use crate::models::{Job, JobStatus};

use super::events::StoreEvent;
use super::state::StoreState;

impl StoreState {
    /// Assign `status` to a job.
    ///
    /// Unknown ids are a silent no-op. Under the strict policy the change must
    /// follow the lifecycle; otherwise any status may be assigned.
    pub fn set_job_status(&mut self, job_id: &str, status: JobStatus) -> Result<()> {
        if self.is_strict() {
            self.check_job_transition(job_id, status)?;
        }
        self.apply_job_status(job_id, status);
        Ok(())
    }

    pub fn add_job(&mut self, job: Job) {
        let job_id = job.id.clone();
        self.jobs.push(job);
        self.emit(StoreEvent::JobAdded { job_id });
    }

    /// Jobs scheduled on `date`.
    pub fn jobs_on(&self, date: chrono::NaiveDate) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(move |j| j.date == date)
    }

    /// Jobs assigned to a technician.
    pub fn jobs_for_tech<'a>(&'a self, tech_id: &'a str) -> impl Iterator<Item = &'a Job> {
        self.jobs.iter().filter(move |j| j.tech_id == tech_id)
    }

    /// Jobs not yet completed or paid.
    pub fn active_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|j| j.status.is_active())
    }

    /// Strict-policy check. Unknown jobs pass: they are no-ops downstream.
    pub(super) fn check_job_transition(&self, job_id: &str, to: JobStatus) -> Result<()> {
        match self.job(job_id) {
            Some(job) if !job.status.can_transition_to(to) => Err(Error::InvalidJobTransition {
                job_id: job_id.to_string(),
                from: job.status,
                to,
            }),
            _ => Ok(()),
        }
    }

    /// Overwrite a job's status without any lifecycle check.
    pub(super) fn apply_job_status(&mut self, job_id: &str, status: JobStatus) {
        let Some(job) = self.jobs.iter_mut().find(|j| j.id == job_id) else {
            tracing::debug!(job_id, %status, "status change for unknown job ignored");
            return;
        };
        let from = job.status;
        if from == status {
            return;
        }
        job.status = status;
        self.emit(StoreEvent::JobStatusChanged {
            job_id: job_id.to_string(),
            from,
            to: status,
        });
    }
}
