//! # foodctl
//!
//! Operator CLI for the FoodHub backend. Runs with the service key from
//! `FOODHUB_BACKEND_SERVICE_KEY` (or `.env`) and talks to the same hosted
//! tables as the web client, through `backend::repo::Repo`.

use backend::repo::Repo;
use backend::rows::ReviewStatus;
use backend::{AppError, BackendConfig, Role, SupabaseClient};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing_subscriber::EnvFilter;
use wizard::reconcile::{self, Action, PlannedAction};
use wizard::{ReconcileError, ReconcilePolicy, ReconcileReport};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Backend(#[from] AppError),
    #[error("{0}")]
    Reconcile(#[from] ReconcileError),
    #[error("this command needs FOODHUB_BACKEND_SERVICE_KEY")]
    MissingServiceKey,
    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{failed} account(s) could not be discarded")]
    PartialFailure { failed: usize },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "foodctl", about = "FoodHub backend operations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the auth service answers.
    Ping,
    /// Find registrations abandoned part-way and optionally delete old ones.
    Reconcile(ReconcileArgs),
    Vendors(VendorsCommand),
    Riders(RidersCommand),
    Orders(OrdersCommand),
}

#[derive(Args, Debug)]
struct ReconcileArgs {
    /// Accounts younger than this are still in progress.
    #[arg(long, default_value_t = 24)]
    max_age_hours: i64,

    /// Reported accounts older than this are deleted with --apply.
    #[arg(long, default_value_t = 168)]
    discard_after_hours: i64,

    /// Delete instead of only reporting.
    #[arg(long, default_value_t = false)]
    apply: bool,
}

#[derive(Args, Debug)]
struct VendorsCommand {
    #[command(subcommand)]
    command: ReviewSubcommand,
}

#[derive(Args, Debug)]
struct RidersCommand {
    #[command(subcommand)]
    command: ReviewSubcommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ReviewSubcommand {
    /// List applications waiting for review.
    Pending {
        /// Only applications submitted more than this many hours ago.
        #[arg(long)]
        older_than_hours: Option<i64>,
    },
    Approve { id: String },
    Reject { id: String },
    Suspend { id: String },
}

#[derive(Args, Debug)]
struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Subcommand, Debug)]
enum OrdersSubcommand {
    /// Newest first. Without a filter, every order.
    List(OrderFilter),
}

#[derive(Args, Debug, Default, PartialEq, Eq)]
#[group(multiple = false)]
struct OrderFilter {
    #[arg(long)]
    customer: Option<String>,
    #[arg(long)]
    vendor: Option<String>,
    #[arg(long)]
    rider: Option<String>,
}

impl OrderFilter {
    fn participant(&self) -> (Role, &str) {
        match (&self.customer, &self.vendor, &self.rider) {
            (Some(id), _, _) => (Role::Customer, id),
            (_, Some(id), _) => (Role::Vendor, id),
            (_, _, Some(id)) => (Role::Rider, id),
            _ => (Role::Admin, ""),
        }
    }
}

impl ReviewSubcommand {
    fn target(&self) -> Option<(&str, ReviewStatus)> {
        match self {
            Self::Pending { .. } => None,
            Self::Approve { id } => Some((id, ReviewStatus::Approved)),
            Self::Reject { id } => Some((id, ReviewStatus::Rejected)),
            Self::Suspend { id } => Some((id, ReviewStatus::Suspended)),
        }
    }

    /// Submission cutoff for `pending --older-than-hours`.
    fn cutoff(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        match self {
            Self::Pending { older_than_hours: Some(hours) } => Some(now - Duration::hours(*hours)),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // A missing .env is fine; the variables may come from the shell.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BackendConfig::from_env()?;

    match cli.command {
        Command::Ping => run_ping(config).await,
        command => {
            if config.service_key.is_none() {
                return Err(CliError::MissingServiceKey);
            }
            let client = SupabaseClient::new(config)?;
            match command {
                Command::Reconcile(args) => run_reconcile(&client, &args).await,
                Command::Vendors(vendors) => run_vendors(&client, &vendors.command).await,
                Command::Riders(riders) => run_riders(&client, &riders.command).await,
                Command::Orders(orders) => run_orders(&client, &orders.command).await,
                Command::Ping => Ok(()),
            }
        }
    }
}

async fn run_ping(config: BackendConfig) -> Result<(), CliError> {
    let client = SupabaseClient::new(config)?;
    client.health().await?;
    println!("ok");
    Ok(())
}

// =============================================================================
// RECONCILE
// =============================================================================

async fn run_reconcile(client: &SupabaseClient, args: &ReconcileArgs) -> Result<(), CliError> {
    let policy = ReconcilePolicy::from_hours(args.max_age_hours, args.discard_after_hours)?;
    let now = OffsetDateTime::now_utc();
    let orphans = reconcile::find_orphans(client, now, &policy).await?;
    let planned = reconcile::plan(orphans, now, &policy);
    print!("{}", render_plan(&planned));

    if !args.apply {
        if planned.iter().any(|p| p.action == Action::Discard) {
            println!("dry run; pass --apply to delete the accounts marked discard");
        }
        return Ok(());
    }
    let report = reconcile::apply(client, &planned).await;
    print!("{}", render_report(&report));
    if report.failed.is_empty() { Ok(()) } else { Err(CliError::PartialFailure { failed: report.failed.len() }) }
}

fn render_plan(planned: &[PlannedAction]) -> String {
    if planned.is_empty() {
        return "no abandoned registrations\n".to_owned();
    }
    let mut out = String::new();
    for item in planned {
        let orphan = &item.orphan;
        let action = match item.action {
            Action::Resume => "resume",
            Action::Discard => "discard",
        };
        out.push_str(&format!(
            "{:<8} {:<9} {:<19} {} {}\n",
            action,
            orphan.role.as_str(),
            orphan.reason.as_str(),
            orphan.user_id,
            orphan.email.as_deref().unwrap_or("-"),
        ));
    }
    out
}

fn render_report(report: &ReconcileReport) -> String {
    let mut out = format!("discarded {}, left {} to resume\n", report.discarded.len(), report.resumable);
    for (user_id, err) in &report.failed {
        out.push_str(&format!("failed {user_id}: {err}\n"));
    }
    out
}

// =============================================================================
// REVIEWS & ORDERS
// =============================================================================

async fn run_vendors(client: &SupabaseClient, command: &ReviewSubcommand) -> Result<(), CliError> {
    let repo = Repo::new(client, None);
    let Some((id, status)) = command.target() else {
        let pending = match command.cutoff(OffsetDateTime::now_utc()) {
            Some(cutoff) => repo.stale_vendors(ReviewStatus::PendingReview, cutoff).await?,
            None => repo.vendors_with_status(ReviewStatus::PendingReview).await?,
        };
        return print_json(&pending);
    };
    if repo.vendor(id).await?.is_none() {
        return Err(CliError::NotFound { kind: "vendor", id: id.to_owned() });
    }
    let updated = repo.set_vendor_status(id, status).await?;
    tracing::info!(vendor_id = %updated.id, status = status.label(), "vendor reviewed");
    print_json(&updated)
}

async fn run_riders(client: &SupabaseClient, command: &ReviewSubcommand) -> Result<(), CliError> {
    let repo = Repo::new(client, None);
    let Some((id, status)) = command.target() else {
        let pending = match command.cutoff(OffsetDateTime::now_utc()) {
            Some(cutoff) => repo.stale_riders(ReviewStatus::PendingReview, cutoff).await?,
            None => repo.riders_with_status(ReviewStatus::PendingReview).await?,
        };
        return print_json(&pending);
    };
    if repo.rider(id).await?.is_none() {
        return Err(CliError::NotFound { kind: "rider", id: id.to_owned() });
    }
    let updated = repo.set_rider_status(id, status).await?;
    tracing::info!(rider_id = %updated.id, status = status.label(), "rider reviewed");
    print_json(&updated)
}

async fn run_orders(client: &SupabaseClient, command: &OrdersSubcommand) -> Result<(), CliError> {
    let repo = Repo::new(client, None);
    match command {
        OrdersSubcommand::List(filter) => {
            let (role, user_id) = filter.participant();
            print_json(&repo.orders_for(role, user_id).await?)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
