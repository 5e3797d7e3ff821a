//! CLI administration tool for SwiftURL.
//!
//! Runs maintenance against the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Delete expired URLs now (asks for confirmation)
//! cargo run --bin admin -- cleanup
//!
//! # Show expiration statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Refresh planner statistics for the urls table
//! cargo run --bin admin -- db maintain
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see [`swifturl::config`]); `DATABASE_URL` or the `DB_*`
//! components are required. When a cache backend is configured, swept codes
//! are removed from it as well.

use swifturl::application::services::CleanupService;
use swifturl::config::{self, Config};
use swifturl::domain::repositories::UrlRepository;
use swifturl::infrastructure::persistence::PgUrlRepository;
use swifturl::server::{connect_cache, connect_database};
use swifturl::utils::clock::SystemClock;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing SwiftURL.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Delete expired URLs and their cache entries
    Cleanup {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show expiration statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Run ANALYZE on the urls table and show tuple statistics
    Maintain,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    let pool = Arc::new(connect_database(&config).await?);
    let repository = Arc::new(PgUrlRepository::new(pool));

    match cli.command {
        Commands::Cleanup { yes } => cleanup(&config, repository, yes).await?,
        Commands::Stats => stats(&config, repository).await?,
        Commands::Db { action } => handle_db_action(action, &repository).await?,
    }

    Ok(())
}

async fn cleanup_service(
    config: &Config,
    repository: Arc<PgUrlRepository>,
) -> CleanupService<PgUrlRepository> {
    let cache = connect_cache(config).await;
    CleanupService::new(repository, cache, Arc::new(SystemClock))
}

/// Runs one expiration sweep.
///
/// # Flow
///
/// 1. Show how many URLs are expired
/// 2. Confirm (unless `--yes` flag)
/// 3. Delete them in one statement and clear their cache entries
/// 4. List the removed codes
async fn cleanup(config: &Config, repository: Arc<PgUrlRepository>, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Cleanup expired URLs".bright_blue().bold());
    println!();

    let service = cleanup_service(config, repository).await;

    let stats = service
        .cleanup_stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read statistics: {}", e))?;

    if stats.expired_urls == 0 {
        println!("{}", "  No expired URLs".green());
        return Ok(());
    }

    println!(
        "  Expired URLs: {}",
        stats.expired_urls.to_string().bright_yellow().bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete these URLs?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let report = service
        .cleanup_expired_urls()
        .await
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {}", e))?;

    println!();
    for code in &report.codes {
        println!("  {} {}", "-".bright_black(), code.cyan());
    }
    println!();
    println!(
        "{} {}",
        "✅ Removed".green().bold(),
        format!("{} expired URLs", report.cleaned).green().bold()
    );
    println!();

    Ok(())
}

/// Displays expiration statistics.
///
/// Shows:
/// - Total number of URLs
/// - URLs with an expiry date
/// - URLs that are already expired
async fn stats(config: &Config, repository: Arc<PgUrlRepository>) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let stats = cleanup_service(config, repository)
        .await
        .cleanup_stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read statistics: {}", e))?;

    println!(
        "  URLs:          {}",
        stats.total_urls.to_string().bright_green().bold()
    );
    println!(
        "  With expiry:   {}",
        stats.urls_with_expiry.to_string().bright_green().bold()
    );
    println!(
        "  Expired:       {}",
        stats.expired_urls.to_string().bright_yellow().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, repository: &PgUrlRepository) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            repository
                .ping()
                .await
                .map_err(|e| anyhow::anyhow!("Database check failed: {}", e))?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Maintain => {
            println!("{}", "🛠  Analyzing urls table...".bright_blue());
            println!();

            let table = repository
                .analyze()
                .await
                .map_err(|e| anyhow::anyhow!("Maintenance failed: {}", e))?;

            match table {
                Some(t) => {
                    println!("  Inserts:      {}", t.inserts.to_string().bright_white());
                    println!("  Updates:      {}", t.updates.to_string().bright_white());
                    println!("  Deletes:      {}", t.deletes.to_string().bright_white());
                    println!("  Live tuples:  {}", t.live_tuples.to_string().bright_green());
                    println!("  Dead tuples:  {}", t.dead_tuples.to_string().bright_yellow());
                }
                None => println!("{}", "  No table statistics collected yet".yellow()),
            }

            println!();
            println!("{}", "✅ Maintenance complete".green().bold());
        }
    }

    Ok(())
}
