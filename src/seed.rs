//! Synthetic fixture data the store starts from.

use chrono::{NaiveDate, NaiveTime};

use crate::models::{
    Customer, Equipment, Invoice, InvoiceStatus, Job, JobKind, JobStatus, LineItem, Location, Money,
    PaymentMethod, Role, User,
};

/// Everything the store owns at startup.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub users: Vec<User>,
    pub customers: Vec<Customer>,
    pub equipment: Vec<Equipment>,
    pub jobs: Vec<Job>,
    pub invoices: Vec<Invoice>,
}

impl Seed {
    /// The demo data set, with every job scheduled on `today`.
    pub fn demo(today: NaiveDate) -> Self {
        Self {
            users: users(),
            customers: customers(),
            equipment: equipment(),
            jobs: jobs(today),
            invoices: invoices(),
        }
    }
}

fn user(id: &str, name: &str, email: &str, role: Role, phone: Option<&str>, avatar_key: &str) -> User {
    User {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        role,
        avatar: Some(format!("https://i.pravatar.cc/150?u={avatar_key}")),
        phone: phone.map(Into::into),
    }
}

fn users() -> Vec<User> {
    vec![
        user("u1", "Mike (Owner)", "mike@hvacpro.com", Role::Owner, None, "mike"),
        user("u2", "Sarah Tech", "sarah@hvacpro.com", Role::Technician, Some("555-0123"), "sarah"),
        user("u3", "Dave Tech", "dave@hvacpro.com", Role::Technician, Some("555-0124"), "dave"),
    ]
}

fn customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "c1".into(),
            name: "Alice Johnson".into(),
            address: "123 Maple Ave".into(),
            city: "Springfield".into(),
            phone: "555-0100".into(),
            email: "alice@example.com".into(),
            tags: vec!["VIP".into(), "Maintenance Plan".into()],
            notes: "Gate code 1234. Dog is friendly.".into(),
        },
        Customer {
            id: "c2".into(),
            name: "Bob Smith".into(),
            address: "456 Oak St".into(),
            city: "Springfield".into(),
            phone: "555-0101".into(),
            email: "bob@example.com".into(),
            tags: vec!["Warranty".into()],
            notes: "Unit is in the attic.".into(),
        },
        Customer {
            id: "c3".into(),
            name: "Carol White".into(),
            address: "789 Pine Ln".into(),
            city: "Shelbyville".into(),
            phone: "555-0102".into(),
            email: "carol@example.com".into(),
            tags: Vec::new(),
            notes: String::new(),
        },
    ]
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

fn equipment() -> Vec<Equipment> {
    let unit = |id: &str, customer: &str, kind: &str, brand: &str, model: &str, serial: &str, installed: NaiveDate| {
        Equipment {
            id: id.into(),
            customer_id: customer.into(),
            kind: kind.into(),
            brand: brand.into(),
            model: model.into(),
            serial: serial.into(),
            install_date: installed,
        }
    };
    vec![
        unit("e1", "c1", "AC Unit", "Trane", "XR14", "T12345678", date(2020, 5, 15)),
        unit("e2", "c1", "Furnace", "Trane", "S9V2", "F98765432", date(2020, 5, 15)),
        unit("e3", "c2", "Heat Pump", "Carrier", "Infinity 18", "C11223344", date(2022, 11, 10)),
    ]
}

fn jobs(today: NaiveDate) -> Vec<Job> {
    vec![
        Job {
            id: "j1".into(),
            customer_id: "c1".into(),
            tech_id: "u2".into(),
            date: today,
            time_window_start: hm(8, 0),
            time_window_end: hm(10, 0),
            kind: JobKind::Maintenance,
            status: JobStatus::Scheduled,
            description: "Spring AC Tune-up".into(),
            notes: None,
            location: Location { lat: 37.7749, lng: -122.4194 },
        },
        Job {
            id: "j2".into(),
            customer_id: "c2".into(),
            tech_id: "u2".into(),
            date: today,
            time_window_start: hm(10, 30),
            time_window_end: hm(12, 30),
            kind: JobKind::Repair,
            status: JobStatus::Scheduled,
            description: "No cooling, odd noise".into(),
            notes: None,
            location: Location { lat: 37.7849, lng: -122.4094 },
        },
        Job {
            id: "j3".into(),
            customer_id: "c3".into(),
            tech_id: "u3".into(),
            date: today,
            time_window_start: hm(9, 0),
            time_window_end: hm(13, 0),
            kind: JobKind::Install,
            status: JobStatus::Completed,
            description: "New Mini-split install".into(),
            notes: None,
            location: Location { lat: 37.7649, lng: -122.4294 },
        },
    ]
}

fn invoices() -> Vec<Invoice> {
    vec![Invoice {
        id: "inv1".into(),
        job_id: "j3".into(),
        items: vec![
            LineItem::new("li1", "Mini Split System", 1, Money::from_dollars(1200)),
            LineItem::new("li2", "Installation Labor", 4, Money::from_dollars(100)),
        ],
        status: InvoiceStatus::Paid,
        payment_method: Some(PaymentMethod::Card),
        is_offline: false,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_seed_is_consistent() {
        let today = date(2026, 10, 19);
        let seed = Seed::demo(today);

        assert_eq!(seed.users[0].role, Role::Owner);
        assert!(seed.jobs.iter().all(|j| j.date == today));
        for job in &seed.jobs {
            assert!(seed.customers.iter().any(|c| c.id == job.customer_id));
            assert!(seed.users.iter().any(|u| u.id == job.tech_id && u.is_technician()));
        }
        assert_eq!(seed.invoices[0].subtotal(), Money::from_dollars(1600));
        assert_eq!(seed.invoices[0].tax(), Money::from_dollars(128));
        assert_eq!(seed.invoices[0].total(), Money::from_dollars(1728));
    }
}
