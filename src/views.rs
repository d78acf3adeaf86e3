//! Read-only projections the dashboard and schedule screens are built from.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Invoice, Job, Money, User};

/// A technician's jobs in visiting order.
pub fn technician_route(jobs: &[Job], tech_id: &str) -> Vec<Job> {
    let mut route: Vec<Job> = jobs.iter().filter(|j| j.tech_id == tech_id).cloned().collect();
    route.sort_by_key(|j| j.time_window_start);
    route
}

/// Jobs assigned to `tech_id` that still need attention.
pub fn active_jobs_for<'a>(jobs: &'a [Job], tech_id: &str) -> Vec<&'a Job> {
    jobs.iter()
        .filter(|j| j.tech_id == tech_id && j.status.is_active())
        .collect()
}

/// One column of the dispatch board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub tech: User,
    pub jobs: Vec<Job>,
}

/// Per-technician columns of the jobs scheduled on `date`.
pub fn dispatch_board(users: &[User], jobs: &[Job], date: NaiveDate) -> Vec<BoardColumn> {
    users
        .iter()
        .filter(|u| u.is_technician())
        .map(|tech| {
            let mut day: Vec<Job> = jobs
                .iter()
                .filter(|j| j.tech_id == tech.id && j.date == date)
                .cloned()
                .collect();
            day.sort_by_key(|j| j.time_window_start);
            BoardColumn {
                tech: tech.clone(),
                jobs: day,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    pub jobs_today: usize,
    /// Sum of every invoice total, paid or not.
    pub revenue: Money,
    /// Completed or paid.
    pub completed_jobs: usize,
    pub active_jobs: usize,
    pub pending_sync: usize,
}

pub fn dashboard_metrics(jobs: &[Job], invoices: &[Invoice], date: NaiveDate) -> DashboardMetrics {
    DashboardMetrics {
        jobs_today: jobs.iter().filter(|j| j.date == date).count(),
        revenue: invoices.iter().map(Invoice::total).sum(),
        completed_jobs: jobs.iter().filter(|j| j.status.is_finished()).count(),
        active_jobs: jobs.iter().filter(|j| j.status.is_active()).count(),
        pending_sync: invoices.iter().filter(|i| i.is_offline).count(),
    }
}
