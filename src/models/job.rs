use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Where a job sits in the field-service lifecycle.
///
/// The lifecycle is linear: `Scheduled -> EnRoute -> OnSite -> Completed ->
/// Invoiced -> Paid`. Declaration order matches lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Scheduled,
    EnRoute,
    OnSite,
    Completed,
    Invoiced,
    Paid,
}

impl JobStatus {
    #[cfg(test)]
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Scheduled,
        JobStatus::EnRoute,
        JobStatus::OnSite,
        JobStatus::Completed,
        JobStatus::Invoiced,
        JobStatus::Paid,
    ];

    /// The status that follows this one, or `None` once paid.
    pub fn next(self) -> Option<JobStatus> {
        match self {
            JobStatus::Scheduled => Some(JobStatus::EnRoute),
            JobStatus::EnRoute => Some(JobStatus::OnSite),
            JobStatus::OnSite => Some(JobStatus::Completed),
            JobStatus::Completed => Some(JobStatus::Invoiced),
            JobStatus::Invoiced => Some(JobStatus::Paid),
            JobStatus::Paid => None,
        }
    }

    /// Strict lifecycle table: one step forward, or staying put.
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        self == to || self.next() == Some(to)
    }

    /// Active jobs still need a technician's attention.
    pub fn is_active(self) -> bool {
        !matches!(self, JobStatus::Completed | JobStatus::Paid)
    }

    /// Field work is done (completed or already settled).
    pub fn is_finished(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Paid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Scheduled => "SCHEDULED",
            JobStatus::EnRoute => "EN_ROUTE",
            JobStatus::OnSite => "ON_SITE",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Invoiced => "INVOICED",
            JobStatus::Paid => "PAID",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('_', " "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobKind {
    Repair,
    Maintenance,
    Install,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobKind::Repair => "REPAIR",
            JobKind::Maintenance => "MAINTENANCE",
            JobKind::Install => "INSTALL",
        };
        f.write_str(label)
    }
}

/// Mock geolocation. Advisory only, nothing routes on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub customer_id: String,
    pub tech_id: String,
    pub date: NaiveDate,
    pub time_window_start: NaiveTime,
    pub time_window_end: NaiveTime,
    pub kind: JobKind,
    pub status: JobStatus,
    pub description: String,
    pub notes: Option<String>,
    pub location: Location,
}

impl Job {
    /// Arrival window formatted as `HH:MM - HH:MM`.
    pub fn time_window(&self) -> String {
        format!(
            "{} - {}",
            self.time_window_start.format("%H:%M"),
            self.time_window_end.format("%H:%M")
        )
    }
}
