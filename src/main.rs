use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use hvac_dispatch::config::{self, Config, TransitionPolicy};
use hvac_dispatch::connectivity::{ConnectivitySignal, SimulatedNetwork};
use hvac_dispatch::invoice_gen::{self, InvoiceGenerator};
use hvac_dispatch::models::{JobStatus, Money, NewInvoice, NewLineItem, PaymentMethod};
use hvac_dispatch::seed::Seed;
use hvac_dispatch::views;
use hvac_dispatch::{AppStore, StoreEvent, StoreOptions};

#[derive(Parser)]
#[command(name = "hvac-dispatch", version, about = "HVAC field-service dispatch demo")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Start with the simulated network disconnected
    #[arg(long, global = true)]
    offline: bool,

    /// Override HVAC_TRANSITION_POLICY
    #[arg(long, global = true, value_enum)]
    policy: Option<TransitionPolicy>,

    /// Override HVAC_SYNC_LATENCY_MS
    #[arg(long, global = true)]
    sync_latency_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Per-technician columns of a day's jobs
    Board {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// A technician's route in visiting order
    Route { tech_id: String },
    /// Owner metrics, or a technician's summary with --as-user
    Dashboard {
        #[arg(long)]
        as_user: Option<String>,
    },
    /// Render the invoice billed against a job
    Invoice {
        job_id: String,
        /// Write invoice_<id>.md to HVAC_INVOICE_DIR instead of printing it
        #[arg(long)]
        write: bool,
        /// Directory to write into; implies --write
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Walk a job through the lifecycle, billing it offline and syncing
    Demo {
        #[arg(default_value = "j1")]
        job_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "hvac_dispatch=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = config::init()?;
    if cli.offline {
        config.start_online = false;
    }
    if let Some(policy) = cli.policy {
        config.transition_policy = policy;
    }
    if let Some(ms) = cli.sync_latency_ms {
        config.sync_latency_ms = ms;
    }

    let today = Local::now().date_naive();
    let network = SimulatedNetwork::new(config.start_online);
    let store = AppStore::spawn(Seed::demo(today), &network, StoreOptions::from(&config));

    let result = run(cli.command, cli.json, &store, &network, &config, today).await;

    store.shutdown().await?;
    result
}

async fn run(
    command: Command,
    json: bool,
    store: &AppStore,
    network: &SimulatedNetwork,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    match command {
        Command::Board { date } => show_board(store, date.unwrap_or(today), json).await,
        Command::Route { tech_id } => show_route(store, &tech_id, json).await,
        Command::Dashboard { as_user } => show_dashboard(store, as_user.as_deref(), today, json).await,
        Command::Invoice { job_id, write, out } => {
            let out = out.or_else(|| write.then(|| config.invoice_dir.clone()));
            show_invoice(store, &job_id, out, json).await
        }
        Command::Demo { job_id } => run_demo(store, network, config, &job_id).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn show_board(store: &AppStore, date: NaiveDate, json: bool) -> Result<()> {
    let snapshot = store.snapshot().await?;
    let board = views::dispatch_board(&snapshot.users, &snapshot.jobs, date);
    if json {
        return print_json(&board);
    }

    println!("Dispatch board for {}", date);
    for column in board {
        println!("\n{} ({} jobs)", column.tech.name, column.jobs.len());
        for job in column.jobs {
            let customer = snapshot
                .customers
                .iter()
                .find(|c| c.id == job.customer_id)
                .map_or("unknown customer", |c| c.name.as_str());
            println!("  {}  {:<12} {:<24} {}", job.time_window(), job.status, job.description, customer);
        }
    }
    Ok(())
}

async fn show_route(store: &AppStore, tech_id: &str, json: bool) -> Result<()> {
    let jobs = store.jobs_for_tech(tech_id).await?;
    let route = views::technician_route(&jobs, tech_id);
    if json {
        return print_json(&route);
    }

    if route.is_empty() {
        println!("No jobs assigned to {}", tech_id);
    }
    for job in route {
        println!("{}  {}  {:<12} {}", job.id, job.time_window(), job.status, job.description);
    }
    Ok(())
}

async fn show_dashboard(store: &AppStore, as_user: Option<&str>, today: NaiveDate, json: bool) -> Result<()> {
    if let Some(user_id) = as_user {
        store.set_current_user(user_id).await?;
    }
    let snapshot = store.snapshot().await?;
    let user = snapshot.current_user.as_ref().context("no users seeded")?;
    if let Some(requested) = as_user {
        if user.id != requested {
            bail!("unknown user {}", requested);
        }
    }

    if user.is_technician() {
        let active = views::active_jobs_for(&snapshot.jobs, &user.id);
        if json {
            return print_json(&active);
        }
        println!("Welcome, {}", user.first_name());
        println!("You have {} active jobs today.", active.len());
        return Ok(());
    }

    let metrics = views::dashboard_metrics(&snapshot.jobs, &snapshot.invoices, today);
    if json {
        return print_json(&metrics);
    }
    println!("Owner dashboard for {}", today);
    println!("  Jobs today:     {}", metrics.jobs_today);
    println!("  Revenue:        {}", metrics.revenue);
    println!("  Completed jobs: {}", metrics.completed_jobs);
    println!("  Active jobs:    {}", metrics.active_jobs);
    println!("  Pending sync:   {}", metrics.pending_sync);
    Ok(())
}

async fn show_invoice(store: &AppStore, job_id: &str, out: Option<PathBuf>, json: bool) -> Result<()> {
    let snapshot = store.snapshot().await?;
    let job = snapshot
        .jobs
        .iter()
        .find(|j| j.id == job_id)
        .with_context(|| format!("unknown job {}", job_id))?;
    let invoice = snapshot
        .invoices
        .iter()
        .find(|i| i.job_id == job_id)
        .with_context(|| format!("job {} has not been invoiced", job_id))?;
    let customer = snapshot
        .customers
        .iter()
        .find(|c| c.id == job.customer_id)
        .with_context(|| format!("job {} has no customer on file", job_id))?;

    if json {
        return print_json(invoice);
    }
    match out {
        Some(dir) => {
            let path = InvoiceGenerator::new(dir)?.generate_invoice(invoice, job, customer)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", invoice_gen::render_markdown(invoice, job, customer)),
    }
    Ok(())
}

/// Print events published so far. The read acts as a barrier: the store
/// publishes a change's events before it serves the next message.
async fn flush_events(store: &AppStore, events: &mut broadcast::Receiver<StoreEvent>) -> Result<()> {
    store.is_online().await?;
    loop {
        match events.try_recv() {
            Ok(event) => println!("  • {}", event),
            Err(TryRecvError::Lagged(skipped)) => println!("  • ({} events skipped)", skipped),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Wait for the store to see the network indicator's current value.
async fn wait_for_connectivity(store: &AppStore, online: bool) -> Result<()> {
    while store.is_online().await? != online {
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    Ok(())
}

/// Wait for every offline draft to sync. Returns false on timeout.
async fn wait_for_sync(store: &AppStore, limit: Duration) -> Result<bool> {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        if store.pending_sync_count().await? == 0 {
            return Ok(true);
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn run_demo(store: &AppStore, network: &SimulatedNetwork, config: &Config, job_id: &str) -> Result<()> {
    let mut events = store.subscribe();
    let job = store
        .job(job_id)
        .await?
        .with_context(|| format!("unknown job {}", job_id))?;
    println!("Job {}: {} ({})", job.id, job.description, job.status);

    println!("\nTechnician works the job");
    for status in [JobStatus::EnRoute, JobStatus::OnSite, JobStatus::Completed] {
        store.set_job_status(job_id, status).await?;
    }
    flush_events(store, &mut events).await?;

    println!("\nSignal drops");
    network.go_offline();
    wait_for_connectivity(store, false).await?;
    flush_events(store, &mut events).await?;

    let invoice = store
        .create_invoice(NewInvoice::new(
            job_id,
            vec![NewLineItem::new("Service Call Fee", 1, Money::from_dollars(89))],
        ))
        .await?;
    flush_events(store, &mut events).await?;
    println!(
        "  invoice {} total {} status {} offline={}",
        invoice.id,
        invoice.total(),
        invoice.status,
        invoice.is_offline
    );

    if let Err(err) = store.record_payment(&invoice.id, PaymentMethod::Card).await {
        println!("  payment refused: {}", err);
    }

    println!("\nSignal returns");
    network.go_online();
    let limit = config.sync_latency() + Duration::from_secs(1);
    wait_for_connectivity(store, true).await?;
    let synced = wait_for_sync(store, limit).await?;
    flush_events(store, &mut events).await?;
    if !synced {
        bail!("offline drafts did not sync within {:?}", limit);
    }

    println!("\nCollect payment");
    let paid = store.record_payment(&invoice.id, PaymentMethod::Card).await?;
    flush_events(store, &mut events).await?;

    let job = store
        .job(job_id)
        .await?
        .with_context(|| format!("unknown job {}", job_id))?;
    println!(
        "\nFinal: job {} is {}, invoice {} is {} ({}), network {}",
        job.id,
        job.status,
        paid.id,
        paid.status,
        paid.total(),
        if network.is_online() { "online" } else { "offline" }
    );
    Ok(())
}
