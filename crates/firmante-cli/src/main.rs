//! Firmante CLI - administration tool for the document-signing backend
//!
//! - `db migrate` / `db health` — deploy-pipeline database checks
//! - `scheduler due-reminders` / `scheduler expire-overdue` — the C10
//!   Reminder Scheduler hook, meant to be invoked by an external cron
//!
//! # Quick Start
//!
//! ```bash
//! firmante db migrate
//! firmante scheduler due-reminders --send
//! firmante scheduler expire-overdue
//! ```

use clap::{Parser, Subcommand};
use colored::*;

mod commands;

use commands::{db, scheduler};
use firmante_db::{Database, DatabaseConfig};

/// Firmante CLI - administration tool for the document-signing backend
#[derive(Parser)]
#[command(name = "firmante")]
#[command(author = "Firmante Contributors")]
#[command(version)]
#[command(about = "Administration CLI for the Firmante document-signing backend", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        action: DbCommands,
    },

    /// Reminder Scheduler hook (spec §4.10, C10)
    Scheduler {
        #[command(subcommand)]
        action: SchedulerCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Run pending migrations
    Migrate,

    /// Check PostgreSQL and Redis connectivity
    Health,
}

#[derive(Subcommand)]
enum SchedulerCommands {
    /// List (and optionally send) reminders for documents nearing their deadline
    DueReminders {
        /// Actually dispatch reminder emails, not just list them
        #[arg(long)]
        send: bool,
    },

    /// Transition past-deadline documents to EXPIRED
    ExpireOverdue,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    print_banner();

    let db_config = DatabaseConfig::from_env();
    let db = Database::connect(&db_config).await?;

    match cli.command {
        Commands::Db { action } => match action {
            DbCommands::Migrate => db::migrate(&db).await?,
            DbCommands::Health => db::health_check(&db).await?,
        },
        Commands::Scheduler { action } => match action {
            SchedulerCommands::DueReminders { send } => scheduler::due_reminders(&db, send).await?,
            SchedulerCommands::ExpireOverdue => scheduler::expire_overdue(&db).await?,
        },
    }

    Ok(())
}

fn print_banner() {
    println!();
    println!("{}", "Firmante".bright_white().bold());
    println!("{}", "─".repeat(40).bright_cyan());
}
